//! Headless widget runtime for Skydeck.
//!
//! A widget lives inside a host surface. The host pushes globals (theme,
//! layout, last tool input/output, persisted widget state), lets the widget
//! call tools, and accepts widget-state writes. This crate models those seams
//! explicitly and implements the logic that sits between them:
//!
//! - [`context`]: the host globals snapshot with keyed change subscriptions
//! - [`bridge`]: tool invocation and widget-state persistence capabilities
//! - [`extract`]: recovery of typed payloads from loosely typed tool results
//! - [`sync`]: task-board mutations mirrored to the view and to the host
//! - [`weather`]: the weather widget's load state machine
//! - [`render`]: view models and HTML for the weather card and the board

pub mod bridge;
pub mod context;
pub mod extract;
pub mod layout;
pub mod render;
pub mod sync;
pub mod weather;

pub use bridge::{HostCapabilities, HostError, MemoryStateStore, ToolInvoker, WidgetStateStore};
pub use context::{GlobalSubscription, HostContext};
pub use extract::{PayloadSource, ResolvedPayload, ToolPayload, extract_payload, resolve_payload};
pub use sync::{BoardSynchronizer, PendingWrite, TASKS_STATE_KEY, TaskIdMinter, reconcile_initial_tasks, tasks_from_value};
pub use weather::{DEFAULT_COORDINATES, LoadState, WEATHER_TOOL_NAME, WeatherWidget, WidgetError, observation_from_result};
