//! Shared type definitions for the Skydeck tool server and widget runtime.
//!
//! The server crate produces these values from tool handlers, and the widget
//! crate recovers them from loosely typed tool-call results and host-pushed
//! globals. Keeping them in one crate guarantees both sides agree on the
//! wire shape.

pub mod host;
pub mod task;
pub mod tool_result;
pub mod weather;

pub use host::{
    DeviceCapabilities, DeviceInfo, DeviceType, DisplayMode, GlobalKey, HostGlobals, HostGlobalsPatch, SafeArea, SafeAreaInsets, Theme,
    UserAgent,
};
pub use task::{ParseTaskStatusError, Task, TaskBoard, TaskPriority, TaskStatus, seed_tasks};
pub use tool_result::{ContentItem, ToolResult};
pub use weather::{Coordinates, Reading, WEATHER_SOURCE, WeatherObservation};
