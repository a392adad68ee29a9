mod common;

use common::identity;
use tokio::sync::watch;
use tokio::time::{sleep, Duration};
use voltport::routes::{return_path, AuthGate, GateDecision, Route};
use voltport::session::SessionState;

#[test]
fn test_route_parse_and_path_round_trip() {
    let routes = [
        Route::Home,
        Route::AllProducts,
        Route::ProductDetails("66f1c2".to_string()),
        Route::AddExport,
        Route::MyExports,
        Route::MyImports,
        Route::Profile,
        Route::Login,
        Route::Register,
    ];
    for route in routes {
        assert_eq!(Route::parse(&route.path()), route);
    }
}

#[test]
fn test_route_parse_normalizes() {
    assert_eq!(Route::parse(""), Route::Home);
    assert_eq!(Route::parse("/my-imports/"), Route::MyImports);
    assert_eq!(Route::parse("/all-products?sort=price"), Route::AllProducts);
    assert_eq!(Route::parse("/product-details/abc#specs"), Route::ProductDetails("abc".to_string()));
    assert!(matches!(Route::parse("/product-details"), Route::NotFound(_)));
    assert!(matches!(Route::parse("/garage"), Route::NotFound(_)));
}

#[test]
fn test_protected_routes() {
    assert!(Route::parse("/product-details/1").is_protected());
    assert!(Route::AddExport.is_protected());
    assert!(Route::MyExports.is_protected());
    assert!(Route::MyImports.is_protected());
    assert!(Route::Profile.is_protected());
    assert!(!Route::Home.is_protected());
    assert!(!Route::AllProducts.is_protected());
    assert!(!Route::Login.is_protected());
}

#[test]
fn test_gate_redirects_and_preserves_requested_path() {
    let decision = AuthGate::decide(&SessionState::SignedOut, "/product-details/42");
    assert_eq!(
        decision,
        GateDecision::Redirect {
            to: "/login".to_string(),
            from: "/product-details/42".to_string(),
        }
    );

    let GateDecision::Redirect { from, .. } = decision else {
        unreachable!()
    };
    assert_eq!(return_path(Some(&from)), "/product-details/42");
}

#[test]
fn test_gate_decisions() {
    assert_eq!(AuthGate::decide(&SessionState::Resolving, "/my-exports"), GateDecision::Loading);
    assert_eq!(AuthGate::decide(&SessionState::SignedOut, "/all-products"), GateDecision::Allow(Route::AllProducts));

    let signed_in = SessionState::SignedIn(identity("driver@example.com"));
    assert_eq!(AuthGate::decide(&signed_in, "/my-exports"), GateDecision::Allow(Route::MyExports));

    // An identity without a usable email cannot open protected routes
    let no_email = SessionState::SignedIn(identity(""));
    assert!(matches!(AuthGate::decide(&no_email, "/profile"), GateDecision::Redirect { .. }));
}

#[test]
fn test_return_path_skips_auth_pages() {
    assert_eq!(return_path(None), "/");
    assert_eq!(return_path(Some("")), "/");
    assert_eq!(return_path(Some("/login")), "/");
    assert_eq!(return_path(Some("/register")), "/");
    assert_eq!(return_path(Some("/my-imports")), "/my-imports");
    assert_eq!(return_path(Some("//evil.example/x")), "/");
    assert_eq!(return_path(Some("https://evil.example")), "/");
    assert_eq!(return_path(Some("/\\evil.example")), "/");
    assert_eq!(return_path(Some("my-imports")), "/");
}

#[tokio::test]
async fn test_resolve_waits_for_session() {
    let (tx, rx) = watch::channel(SessionState::Resolving);

    let gate = tokio::spawn(async move { AuthGate::resolve(rx, "/add-export").await });
    sleep(Duration::from_millis(20)).await;
    assert!(!gate.is_finished());

    tx.send_replace(SessionState::SignedIn(identity("driver@example.com")));
    assert_eq!(gate.await.unwrap(), GateDecision::Allow(Route::AddExport));
}

#[tokio::test]
async fn test_resolve_with_closed_channel_is_signed_out() {
    let (tx, rx) = watch::channel(SessionState::Resolving);
    drop(tx);
    assert!(matches!(
        AuthGate::resolve(rx, "/profile").await,
        GateDecision::Redirect { .. }
    ));
}
