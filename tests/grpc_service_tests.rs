use std::time::Duration;

use tonic::{Code, Request};

use cleaner::grpc::CleanerServiceImpl;
use cleaner::pool::{SpeedClass, TeamPool};
use cleaner::proto::cleaner_service_server::CleanerService;
use cleaner::proto::{
    GetAvailableTeamsIn, GetTeamsStatsIn, ProceedCleaningIn, Request as ProtoRequest, Speed,
};
use cleaner::scheduler::{CleaningScheduler, CleaningTimer};

/// Helper to create a service over a pool with the given speeds
fn create_test_service(speeds: &[SpeedClass]) -> CleanerServiceImpl {
    create_test_service_with_base(speeds, Duration::from_secs(600), 3)
}

fn create_test_service_with_base(
    speeds: &[SpeedClass],
    base: Duration,
    seed: u64,
) -> CleanerServiceImpl {
    let pool = if speeds.is_empty() {
        TeamPool::default()
    } else {
        TeamPool::with_speeds(speeds.iter().copied()).unwrap()
    };
    let timer = CleaningTimer::with_seed(base, seed);
    CleanerServiceImpl::new(CleaningScheduler::new(pool, timer))
}

fn proceed(team_id: u64, id: u64) -> Request<ProceedCleaningIn> {
    Request::new(ProceedCleaningIn {
        team_id,
        req: Some(ProtoRequest {
            id,
            client_id: 77,
            team_id: 0,
            cleaning_type: 3,
            priority: 9,
            time_in_cleaner_ms: 0,
        }),
    })
}

#[tokio::test(start_paused = true)]
async fn test_proceed_cleaning_echoes_request() {
    let service = create_test_service(&[SpeedClass::Mid, SpeedClass::Slow]);

    let resp = service.proceed_cleaning(proceed(1, 10)).await.unwrap().into_inner();

    assert_eq!(resp.team_id, 1);
    assert!(resp.duration_ms > 0);
    let req = resp.req.unwrap();
    assert_eq!(req.id, 10);
    assert_eq!(req.client_id, 77);
    assert_eq!(req.team_id, 1);
    assert_eq!(req.cleaning_type, 3);
    assert_eq!(req.priority, 9);
    assert_eq!(req.time_in_cleaner_ms, resp.duration_ms);
}

/// Durations shorter than a millisecond are reported as 1 ms, never 0.
#[tokio::test(start_paused = true)]
async fn test_sub_millisecond_duration_rounds_up() {
    let service =
        create_test_service_with_base(&[SpeedClass::Fast], Duration::from_micros(100), 17);

    for id in 0..100 {
        let resp = service.proceed_cleaning(proceed(0, id)).await.unwrap().into_inner();
        assert_eq!(resp.duration_ms, 1, "request {}", id);
        assert_eq!(resp.req.unwrap().time_in_cleaner_ms, 1);

        tokio::time::sleep(Duration::from_millis(2)).await;
        tokio::task::yield_now().await;
    }

    let stats = service
        .get_teams_stats(Request::new(GetTeamsStatsIn {}))
        .await
        .unwrap()
        .into_inner()
        .stats;
    assert_eq!(stats[0].processed_requests, 100);
    assert!(stats[0].total_busy_time_ms >= 1);
}

#[tokio::test(start_paused = true)]
async fn test_proceed_cleaning_unknown_team_is_not_found() {
    let service = create_test_service(&[SpeedClass::Fast; 10]);

    let status = service.proceed_cleaning(proceed(99, 1)).await.unwrap_err();
    assert_eq!(status.code(), Code::NotFound);
}

#[tokio::test(start_paused = true)]
async fn test_proceed_cleaning_busy_team_fails_precondition() {
    let service = create_test_service(&[SpeedClass::Slow]);

    service.proceed_cleaning(proceed(0, 1)).await.unwrap();
    let status = service.proceed_cleaning(proceed(0, 2)).await.unwrap_err();
    assert_eq!(status.code(), Code::FailedPrecondition);
}

#[tokio::test(start_paused = true)]
async fn test_proceed_cleaning_requires_request() {
    let service = create_test_service(&[SpeedClass::Slow]);

    let status = service
        .proceed_cleaning(Request::new(ProceedCleaningIn {
            team_id: 0,
            req: None,
        }))
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::InvalidArgument);

    // Nothing was assigned
    let resp = service
        .get_available_teams(Request::new(GetAvailableTeamsIn {}))
        .await
        .unwrap()
        .into_inner();
    assert_eq!(resp.teams_ids, vec![0]);
}

#[tokio::test(start_paused = true)]
async fn test_get_available_teams_excludes_busy() {
    let service = create_test_service(&[SpeedClass::Fast, SpeedClass::Mid, SpeedClass::Slow]);
    service.proceed_cleaning(proceed(1, 1)).await.unwrap();

    let resp = service
        .get_available_teams(Request::new(GetAvailableTeamsIn {}))
        .await
        .unwrap()
        .into_inner();
    assert_eq!(resp.teams_ids, vec![0, 2]);
}

#[tokio::test(start_paused = true)]
async fn test_get_teams_stats_reports_speed_and_counters() {
    let service = create_test_service(&[SpeedClass::Slow, SpeedClass::Fast]);

    let resp = service.proceed_cleaning(proceed(1, 1)).await.unwrap().into_inner();
    tokio::time::sleep(Duration::from_millis(resp.duration_ms + 2)).await;
    tokio::task::yield_now().await;

    let stats = service
        .get_teams_stats(Request::new(GetTeamsStatsIn {}))
        .await
        .unwrap()
        .into_inner()
        .stats;

    assert_eq!(stats.len(), 2);
    assert_eq!(stats[0].id, 0);
    assert_eq!(stats[0].speed, Speed::Slow as i32);
    assert_eq!(stats[0].processed_requests, 0);
    assert_eq!(stats[1].id, 1);
    assert_eq!(stats[1].speed, Speed::Fast as i32);
    assert_eq!(stats[1].processed_requests, 1);
    assert!(stats[1].total_busy_time_ms >= resp.duration_ms);
}

#[tokio::test]
async fn test_queries_on_empty_pool_are_unavailable() {
    let service = create_test_service(&[]);

    let status = service
        .get_available_teams(Request::new(GetAvailableTeamsIn {}))
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::Unavailable);

    let status = service
        .get_teams_stats(Request::new(GetTeamsStatsIn {}))
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::Unavailable);
}
