//! Cross-crate flows.

pub mod counter_app;
pub mod dispatch;
pub mod dryrun_flow;

#[cfg(test)]
pub(crate) mod fixtures {
    use aad_apps::prelude::*;
    use aad_types::Address;

    pub fn creator() -> Address {
        Address::new([0xAA; 32])
    }

    pub fn player() -> Address {
        Address::new([0xBB; 32])
    }

    /// A counter in global state, incremented by the `count` invocation.
    pub fn counter_app() -> AppBuilder {
        aad_telemetry::init_test_logging();

        let state = StateGlobal::new([KeyInfo::uint("counter")
            .unwrap()
            .with_default(Expr::int(0))
            .unwrap()])
        .unwrap();
        let count = state
            .set("counter", state.get("counter").unwrap() + Expr::int(1))
            .unwrap();
        AppBuilder::new()
            .with_global_state(state)
            .with_invocation("count", Expr::seq([count, Expr::approve()]))
            .unwrap()
    }
}
