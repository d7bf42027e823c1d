use crate::context::SimContext;
use crate::error::SimResult;

/// A simulation subsystem that runs each frame.
///
/// Spawners implement this; extra systems registered on the
/// [`Simulation`](crate::Simulation) run after them in registration order.
pub trait System: std::fmt::Debug {
    /// Human-readable name for this system.
    fn name(&self) -> &str;

    /// Called once per frame.
    fn tick(&mut self, ctx: &mut SimContext<'_>) -> SimResult<()>;

    /// Called once before the first frame. Optional setup hook.
    fn init(&mut self, _ctx: &mut SimContext<'_>) -> SimResult<()> {
        Ok(())
    }

    /// Support downcasting to concrete types.
    fn as_any(&self) -> &dyn std::any::Any;

    /// Support downcasting to concrete types.
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any;
}
