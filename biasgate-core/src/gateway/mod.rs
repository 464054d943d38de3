//! # HTTP Gateway
//!
//! Exposes the detector over HTTP: `POST /check-bias` screens a roster and
//! `GET /health` reports liveness. Handlers share one immutable
//! [`GatewayState`]; nothing persists between requests.

mod server;

pub use server::{
    GatewayState, SharedState, router as gateway_router, run as run_gateway,
};
