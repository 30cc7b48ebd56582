//! Behavioural tests for [`Resolver`].
//!
//! Scenarios run on a paused current-thread Tokio runtime, so the debounce
//! window and scripted geocoder delays elapse instantly and deterministically.

use std::cell::RefCell;
use std::time::Duration;

use pinpoint_core::test_support::StubGeocoder;
use pinpoint_core::{AddressResult, GeocodeError, Resolver, ResolverConfig, Snapshot};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tokio::runtime::Runtime;
use tokio::time::sleep;

/// Shared scenario state.
#[derive(Default)]
struct ResolverWorld {
    stub: StubGeocoder,
    config: ResolverConfig,
    resolver: Option<Resolver>,
    during_lookup: Option<Snapshot>,
    settled: Option<Snapshot>,
}

impl ResolverWorld {
    fn resolver(&mut self) -> &Resolver {
        let stub = self.stub.clone();
        let config = self.config.clone();
        self.resolver
            .get_or_insert_with(|| Resolver::spawn(stub, config).expect("config should be valid"))
    }

    fn settled(&self) -> &Snapshot {
        self.settled.as_ref().expect("a when step must record the settled state")
    }
}

type WorldCell = RefCell<ResolverWorld>;

#[fixture]
fn runtime() -> Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .start_paused(true)
        .build()
        .expect("runtime should build")
}

#[fixture]
fn world() -> WorldCell {
    RefCell::new(ResolverWorld::default())
}

fn berlin() -> AddressResult {
    AddressResult::new("Berlin, Germany", 52.5, 13.4)
}

fn unreachable() -> GeocodeError {
    GeocodeError::Network {
        url: "https://nominatim.example/search".to_owned(),
        message: "connection refused".to_owned(),
    }
}

async fn quiet(resolver: &Resolver) -> Snapshot {
    resolver
        .wait_for(|snapshot| !snapshot.settling && !snapshot.loading)
        .await
        .expect("resolver should keep running")
}

// --- Given steps ---

#[given("a geocoder that knows Berlin")]
fn geocoder_knows_berlin(#[from(world)] world: &WorldCell) {
    let world = world.borrow();
    world.stub.respond_with("ber", vec![berlin()]);
    world.stub.delay("ber", Duration::from_millis(200));
}

#[given("a geocoder that cannot be reached")]
fn geocoder_unreachable(#[from(world)] world: &WorldCell) {
    let world = world.borrow();
    world.stub.fail_with("ber", unreachable());
    world.stub.delay("ber", Duration::from_millis(200));
}

#[given("a geocoder that knows Berlin but fails for berlin")]
fn geocoder_fails_for_berlin(#[from(world)] world: &WorldCell) {
    let world = world.borrow();
    world.stub.respond_with("ber", vec![berlin()]);
    world.stub.delay("ber", Duration::from_millis(200));
    world.stub.fail_with("berlin", unreachable());
    world.stub.delay("berlin", Duration::from_millis(200));
}

#[given("a geocoder that answers berl slowly")]
fn geocoder_answers_berl_slowly(#[from(world)] world: &WorldCell) {
    let world = world.borrow();
    world
        .stub
        .respond_with("berl", vec![AddressResult::new("Berlstedt, Germany", 51.1, 11.2)]);
    world.stub.delay("berl", Duration::from_secs(2));
    world.stub.respond_with("berlin", vec![berlin()]);
    world.stub.delay("berlin", Duration::from_millis(100));
}

#[given("superseded lookups are left running")]
fn superseded_lookups_run(#[from(world)] world: &WorldCell) {
    let mut world = world.borrow_mut();
    world.config = world.config.clone().with_abort_superseded(false);
}

// --- When steps ---

#[when("the user types b, be and ber 100ms apart and pauses")]
fn type_ber(#[from(runtime)] runtime: &Runtime, #[from(world)] world: &WorldCell) {
    let mut world = world.borrow_mut();
    let (during, settled) = runtime.block_on(async {
        let resolver = world.resolver();
        for query in ["b", "be", "ber"] {
            resolver.set_query(query).expect("resolver should accept input");
            sleep(Duration::from_millis(100)).await;
        }
        // 550ms after "ber": the window has elapsed, the lookup is in flight.
        sleep(Duration::from_millis(450)).await;
        let during = resolver.snapshot();
        (during, quiet(resolver).await)
    });
    world.during_lookup = Some(during);
    world.settled = Some(settled);
}

#[when("the user extends the query to berlin and pauses")]
fn extend_to_berlin(#[from(runtime)] runtime: &Runtime, #[from(world)] world: &WorldCell) {
    let mut world = world.borrow_mut();
    let settled = runtime.block_on(async {
        let resolver = world.resolver();
        resolver.set_query("berlin").expect("resolver should accept input");
        sleep(Duration::from_millis(600)).await;
        quiet(resolver).await
    });
    world.settled = Some(settled);
}

#[when("the user types xy and pauses")]
fn type_xy(#[from(runtime)] runtime: &Runtime, #[from(world)] world: &WorldCell) {
    let mut world = world.borrow_mut();
    let settled = runtime.block_on(async {
        let resolver = world.resolver();
        resolver.set_query("xy").expect("resolver should accept input");
        sleep(Duration::from_secs(1)).await;
        resolver.snapshot()
    });
    world.settled = Some(settled);
}

#[when("the user types berl, pauses briefly and then types berlin")]
fn type_berl_then_berlin(#[from(runtime)] runtime: &Runtime, #[from(world)] world: &WorldCell) {
    let mut world = world.borrow_mut();
    let settled = runtime.block_on(async {
        let resolver = world.resolver();
        resolver.set_query("berl").expect("resolver should accept input");
        // The berl lookup starts at 500ms and is still running at 600ms.
        sleep(Duration::from_millis(600)).await;
        resolver.set_query("berlin").expect("resolver should accept input");
        sleep(Duration::from_millis(600)).await;
        quiet(resolver).await
    });
    world.settled = Some(settled);
}

#[when("the slow lookup eventually completes")]
fn slow_lookup_completes(#[from(runtime)] runtime: &Runtime, #[from(world)] world: &WorldCell) {
    let mut world = world.borrow_mut();
    let settled = runtime.block_on(async {
        let resolver = world.resolver();
        sleep(Duration::from_secs(3)).await;
        resolver.snapshot()
    });
    world.settled = Some(settled);
}

#[when("the user types bert and corrects it back to ber")]
fn type_bert_then_ber(#[from(runtime)] runtime: &Runtime, #[from(world)] world: &WorldCell) {
    let mut world = world.borrow_mut();
    let settled = runtime.block_on(async {
        let resolver = world.resolver();
        resolver.set_query("bert").expect("resolver should accept input");
        sleep(Duration::from_millis(100)).await;
        resolver.set_query("ber").expect("resolver should accept input");
        sleep(Duration::from_secs(1)).await;
        resolver.snapshot()
    });
    world.settled = Some(settled);
}

// --- Then steps ---

#[then("exactly one lookup was issued for ber")]
fn one_lookup_for_ber(#[from(world)] world: &WorldCell) {
    assert_eq!(world.borrow().stub.calls(), vec!["ber".to_owned()]);
}

#[then("no lookup was issued")]
fn no_lookup(#[from(world)] world: &WorldCell) {
    assert!(world.borrow().stub.calls().is_empty());
}

#[then("lookups were issued for berl and berlin")]
fn lookups_for_berl_and_berlin(#[from(world)] world: &WorldCell) {
    assert_eq!(
        world.borrow().stub.calls(),
        vec!["berl".to_owned(), "berlin".to_owned()]
    );
}

#[then("the resolver was loading during the lookup")]
fn loading_during_lookup(#[from(world)] world: &WorldCell) {
    let world = world.borrow();
    let during = world.during_lookup.as_ref().expect("snapshot during lookup");
    assert!(during.loading, "expected loading, got {during:?}");
    assert!(during.results.is_empty());
}

#[then("the results contain Berlin without an error")]
fn results_contain_berlin(#[from(world)] world: &WorldCell) {
    let world = world.borrow();
    let settled = world.settled();
    assert_eq!(settled.results, vec![berlin()]);
    assert!(!settled.loading);
    assert_eq!(settled.error, None);
}

#[then("the results are empty and an error is reported")]
fn empty_with_error(#[from(world)] world: &WorldCell) {
    let world = world.borrow();
    let settled = world.settled();
    assert!(settled.results.is_empty());
    assert!(!settled.loading);
    assert_eq!(settled.error, Some(unreachable()));
}

#[then("the results contain Berlin alongside an error")]
fn berlin_with_error(#[from(world)] world: &WorldCell) {
    let world = world.borrow();
    let settled = world.settled();
    assert_eq!(settled.results, vec![berlin()]);
    assert!(!settled.loading);
    assert_eq!(settled.error, Some(unreachable()));
}

#[then("the results are empty without an error")]
fn empty_without_error(#[from(world)] world: &WorldCell) {
    let world = world.borrow();
    let settled = world.settled();
    assert!(settled.results.is_empty());
    assert!(!settled.loading);
    assert_eq!(settled.error, None);
}

#[then("the results show Berlin from the latest query")]
fn results_from_latest_query(#[from(world)] world: &WorldCell) {
    let world = world.borrow();
    let settled = world.settled();
    assert_eq!(settled.settled, "berlin");
    assert_eq!(settled.results, vec![berlin()]);
    assert!(!settled.loading);
}

// --- Scenario registrations ---

macro_rules! register_scenario {
    ($fn_name:ident, $title:literal) => {
        #[scenario(path = "tests/features/resolver.feature", name = $title)]
        fn $fn_name(runtime: Runtime, world: WorldCell) {
            let _ = (runtime, world);
        }
    };
}

register_scenario!(settling_on_a_typed_query, "settling on a typed query");
register_scenario!(failing_on_the_first_lookup, "failing on the first lookup");
register_scenario!(failing_after_an_earlier_success, "failing after an earlier success");
register_scenario!(ignoring_short_queries, "ignoring queries that are too short");
register_scenario!(discarding_a_superseded_lookup, "discarding a superseded lookup");
register_scenario!(repeating_a_settled_query, "repeating a settled query");
