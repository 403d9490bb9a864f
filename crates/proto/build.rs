//! Build script for cryptovote-proto.
//!
//! Compiles protobuf definitions into Rust code using tonic-prost-build and
//! emits the file descriptor set used by gRPC reflection.

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo::rerun-if-changed=../../proto/crypto/v1/crypto.proto");

    let out_dir = std::path::PathBuf::from(std::env::var("OUT_DIR")?);

    tonic_prost_build::configure()
        .file_descriptor_set_path(out_dir.join("crypto_v1_descriptor.bin"))
        .build_server(true)
        .build_client(true)
        .emit_rerun_if_changed(true)
        .compile_protos(&["../../proto/crypto/v1/crypto.proto"], &["../../proto"])?;

    Ok(())
}
