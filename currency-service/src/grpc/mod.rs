//! gRPC transport binding

pub mod server;

pub use server::CurrencyGrpcServer;
