//! Protobuf types and conversions for the crypto vote service.
//!
//! This crate provides:
//! - Generated protobuf types and gRPC service traits ([`proto`])
//! - Conversions from domain types to proto types ([`convert`])

#![deny(unsafe_code)]
// Handlers return tonic::Status
#![allow(clippy::result_large_err)]

/// Generated protobuf types and service traits.
pub mod proto {
    #![allow(clippy::all)]
    #![allow(missing_docs)]

    tonic::include_proto!("crypto.v1");
}

/// Serialized `FileDescriptorSet` for gRPC reflection.
pub const FILE_DESCRIPTOR_SET: &[u8] = tonic::include_file_descriptor_set!("crypto_v1_descriptor");

/// Conversions between domain and protobuf types.
pub mod convert;
