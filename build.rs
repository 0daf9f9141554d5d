use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Use the bundled protoc so builds do not depend on a system install.
    std::env::set_var("PROTOC", protoc_bin_vendored::protoc_bin_path()?);
    println!("cargo:rerun-if-changed=proto/cleaner.proto");

    // The descriptor set backs gRPC server reflection.
    let out_dir = PathBuf::from(std::env::var("OUT_DIR")?);
    tonic_build::configure()
        .file_descriptor_set_path(out_dir.join("cleaner_descriptor.bin"))
        .compile_protos(&["proto/cleaner.proto"], &["proto"])?;
    Ok(())
}
