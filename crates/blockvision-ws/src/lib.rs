//! Reconnecting WebSocket subscriptions for BlockVision event streams.
//!
//! A [`BlockVisionWsProvider`] opens one subscription channel per call to
//! [`subscribe`](BlockVisionWsProvider::subscribe). Each channel is owned by
//! a background task that reconnects on unexpected disconnects and re-sends
//! the subscribe envelope; events arrive on the returned [`Subscription`]
//! handle as a push sequence.

pub mod connector;
pub mod provider;
pub mod subscription;

pub use connector::{TungsteniteConnector, WsConnection, WsConnector, WsFrame};
pub use provider::BlockVisionWsProvider;
pub use subscription::{
    ChannelState, LogFilter, PendingTxFilter, Subscription, SubscriptionEvent, SubscriptionFilter,
    SubscriptionKind,
};
