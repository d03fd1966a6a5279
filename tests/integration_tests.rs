//! Integration tests for nav_router
//!
//! These tests verify the complete navigation workflow: route matching,
//! relative navigation, history, blocking and search params.

use nav_router::*;
use std::cell::RefCell;
use std::rc::Rc;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Page {
    Layout,
    Home,
    Invoices,
    InvoiceList,
    Invoice,
    InvoiceEdit,
    Settings,
    NotFound,
}

fn app_routes() -> Vec<RouteNode<Page>> {
    vec![RouteNode::new("/", Page::Layout).children(vec![
        RouteNode::index(Page::Home),
        RouteNode::new("invoices", Page::Invoices)
            .child(RouteNode::index(Page::InvoiceList))
            .child(RouteNode::new(":invoiceId", Page::Invoice).child(RouteNode::new("edit", Page::InvoiceEdit))),
        RouteNode::new("settings", Page::Settings).case_sensitive(true),
        RouteNode::new("*", Page::NotFound),
    ])]
}

fn pages(matches: &[RouteMatch<'_, Page>]) -> Vec<Page> {
    matches.iter().map(|m| *m.route.payload()).collect()
}

// ============================================================================
// Route Matching Tests
// ============================================================================

#[test]
fn test_match_nested_routes() {
    init_logging();
    let routes = app_routes();

    let matches = match_routes(&routes, "/", "/").unwrap().unwrap();
    assert_eq!(pages(&matches), [Page::Layout, Page::Home]);

    let matches = match_routes(&routes, "/invoices", "/").unwrap().unwrap();
    assert_eq!(pages(&matches), [Page::Layout, Page::Invoices, Page::InvoiceList]);

    let matches = match_routes(&routes, "/invoices/2001/edit", "/").unwrap().unwrap();
    assert_eq!(
        pages(&matches),
        [Page::Layout, Page::Invoices, Page::Invoice, Page::InvoiceEdit]
    );
    assert!(matches.iter().all(|m| m.params.get("invoiceId") == Some("2001")));
}

#[test]
fn test_case_sensitive_route_falls_through_to_splat() {
    let routes = app_routes();

    let matches = match_routes(&routes, "/settings", "/").unwrap().unwrap();
    assert_eq!(pages(&matches), [Page::Layout, Page::Settings]);

    let matches = match_routes(&routes, "/Settings", "/").unwrap().unwrap();
    assert_eq!(pages(&matches), [Page::Layout, Page::NotFound]);
    assert_eq!(matches[1].params.get("*"), Some("Settings"));
}

#[test]
fn test_configuration_errors_surface_from_matching() {
    let routes = vec![RouteNode::new("/admin", ()).child(RouteNode::new("/users", ()))];
    let err = match_routes(&routes, "/admin/users", "/").unwrap_err();
    assert!(matches!(err, ConfigurationError::AbsolutePathNotNested { .. }));
}

#[test]
fn test_generate_then_match() {
    let routes = app_routes();
    let params: Params = [("invoiceId", "77")].into_iter().collect();
    let pathname = generate_path("/invoices/:invoiceId/edit", &params).unwrap();

    let matches = match_routes(&routes, pathname.as_str(), "/").unwrap().unwrap();
    assert_eq!(matches.last().map(|m| *m.route.payload()), Some(Page::InvoiceEdit));
}

#[test]
fn test_shared_matcher_caches_patterns() {
    let routes = app_routes();
    let mut matcher = PathMatcher::new();

    matcher.match_routes(&routes, "/invoices/1", "/").unwrap();
    matcher.match_routes(&routes, "/invoices/2", "/").unwrap();

    #[cfg(feature = "cache")]
    assert!(matcher.cache_stats().hits > 0);
}

// ============================================================================
// Navigation Tests
// ============================================================================

#[test]
fn test_full_navigation_cycle() {
    init_logging();
    let history = History::with_config(MemoryPlatform::new("/"), HistoryConfig::new().seed(1));
    let mut router = Router::new(app_routes(), history);

    let updates = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&updates);
    router
        .history_mut()
        .listen(move |update| sink.borrow_mut().push((update.action, update.location.pathname.clone())));

    router.navigate("invoices", NavigateOptions::new(), &router.context().unwrap());
    router.navigate("2001", NavigateOptions::new(), &router.context().unwrap());
    router.navigate("edit", NavigateOptions::new(), &router.context().unwrap());
    assert_eq!(router.history().location().pathname, "/invoices/2001/edit");

    // `..` walks up one route level: from edit to the invoice
    router.navigate("..", NavigateOptions::new(), &router.context().unwrap());
    assert_eq!(router.history().location().pathname, "/invoices/2001");

    router.navigate_delta(-1);
    assert_eq!(router.history().location().pathname, "/invoices/2001/edit");
    assert_eq!(router.history().action(), Action::Pop);

    assert_eq!(
        *updates.borrow(),
        [
            (Action::Push, "/invoices".to_string()),
            (Action::Push, "/invoices/2001".to_string()),
            (Action::Push, "/invoices/2001/edit".to_string()),
            (Action::Push, "/invoices/2001".to_string()),
            (Action::Pop, "/invoices/2001/edit".to_string()),
        ]
    );
}

#[test]
fn test_navigation_under_basename() {
    let history = History::new(MemoryPlatform::new("/billing/invoices"));
    let mut router = Router::new(app_routes(), history).with_basename("/billing");

    let context = router.context().unwrap();
    assert_eq!(router.href("42", &context), "/billing/invoices/42");

    router.navigate("42", NavigateOptions::new(), &context);
    assert_eq!(router.history().location().pathname, "/billing/invoices/42");

    let matches = router.matches().unwrap().unwrap();
    assert_eq!(matches.last().map(|m| *m.route.payload()), Some(Page::Invoice));
}

#[test]
fn test_search_params_round_trip_through_history() {
    let history = History::new(MemoryPlatform::new("/invoices?status=paid"));
    let mut router = Router::new(app_routes(), history);

    let mut params = router.search_params(&SearchParams::new());
    params.append("status", "overdue");
    params.set("page", "3");
    router.set_search_params(&params, NavigateOptions::new().replace(true), &RouteContext::default());

    let location = router.history().location();
    assert_eq!(location.pathname, "/invoices");
    assert_eq!(location.search, "?status=paid&status=overdue&page=3");
    assert_eq!(router.history().index(), 0);

    let parsed = router.search_params(&SearchParams::new());
    assert_eq!(parsed.get_all("status"), vec!["paid", "overdue"]);
    assert_eq!(parsed.get_as::<u32>("page"), Some(3));
}

// ============================================================================
// Blocking Tests
// ============================================================================

#[test]
fn test_unsaved_changes_prompt_flow() {
    init_logging();
    let mut history = History::new(MemoryPlatform::with_entries(["/", "/invoices", "/invoices/1/edit"], 2));

    let notified = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&notified);
    history.listen(move |_| *counter.borrow_mut() += 1);

    let pending: Rc<RefCell<Vec<Transition>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&pending);
    let blocker = history.block(move |tx| sink.borrow_mut().push(tx.clone()));
    assert!(history.platform().unload_prompt());

    // Back button: reverted, the blocker sees the pop
    history.back();
    assert_eq!(history.location().pathname, "/invoices/1/edit");
    assert_eq!(history.platform().current_index(), 2);

    // Link click: blocked as well
    history.push("/settings", State::Null);
    assert_eq!(pending.borrow().len(), 2);
    assert_eq!(*notified.borrow(), 0);

    // The user discards changes and goes back after all
    history.unblock(blocker);
    assert!(!history.platform().unload_prompt());
    let back = pending.borrow()[0].clone();
    history.retry(&back);

    assert_eq!(history.location().pathname, "/invoices");
    assert_eq!(history.action(), Action::Pop);
    assert_eq!(*notified.borrow(), 1);
}

#[test]
fn test_dropping_a_transition_cancels_it() {
    let mut history = History::new(MemoryPlatform::new("/"));
    let blocker = history.block(|_| {});

    history.push("/a", State::Null);
    history.replace("/b", State::Null);
    history.unblock(blocker);

    assert_eq!(history.location().pathname, "/");
    assert_eq!(history.platform().len(), 1);
}

#[test]
fn test_warnings_are_reported_once() {
    let mut matcher = PathMatcher::new();
    matcher.match_path("/files*", "/files/a").unwrap();
    matcher.match_path("/files*", "/files/b").unwrap();

    assert_eq!(matcher.warnings().emitted().len(), 1);
}
