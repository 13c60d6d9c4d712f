//! Device actuation: the transport client seam and the intent dispatcher.

pub mod client;
pub mod dispatcher;

pub use client::{
    ActionPayload, ActuationClient, HttpActuationClient, HttpClientConfig, MockActuationClient,
    SwitchState,
};
pub use dispatcher::{
    ActionDispatcher, ActionRequest, DispatchConfig, DispatchResult, SwitchMode,
};
