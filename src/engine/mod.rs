pub mod bubbles;
pub mod flow;
pub mod particles;
pub mod path;
pub mod session;
pub mod source;
pub mod timer;
pub mod views;

pub use bubbles::{Bounce, Bubble, BubbleField, ConsumptionPolicy, ConsumptionStatus, FIELD_EXTENT};
pub use flow::{
    FlowEdge, FlowLayout, FlowNode, FlowPreset, StockBoard, StockPolicy, StockReading,
    StockStatus, Tier,
};
pub use particles::{Marker, Particle, ParticleAnimator};
pub use path::FlowPath;
pub use session::{Lifecycle, View, ViewSession};
pub use source::{BubbleSource, RandomWalk, StockSource};
pub use timer::{Scheduler, TimerGuard, TimerId};
pub use views::{BubbleView, EntityClick, FlowView};
