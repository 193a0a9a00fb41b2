//! Property tests for resolution memoization and path normalization.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use baton::{
    Action, App, CallArg, Context, Method, Params, ResponseWriter, Route, RouteTable, Router,
    TrailingSlash,
};
use bytes::Bytes;
use proptest::prelude::*;

struct Counting {
    inner: Router,
    lookups: Arc<AtomicUsize>,
}

impl RouteTable for Counting {
    fn lookup(&self, method: &Method, path: &str) -> Option<(Arc<Route>, Params)> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.lookup(method, path)
    }
}

#[derive(Default)]
struct Part;

fn arb_segment() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z0-9]{1,8}").unwrap()
}

/// Paths that hit `/items/{id}`, `/items/{id}/parts/{part}`, or nothing.
fn arb_path() -> impl Strategy<Value = Vec<String>> {
    prop_oneof![
        arb_segment().prop_map(|id| vec!["items".to_owned(), id]),
        (arb_segment(), arb_segment())
            .prop_map(|(id, part)| vec!["items".to_owned(), id, "parts".to_owned(), part]),
        prop::collection::vec(arb_segment(), 1..4),
    ]
}

proptest! {
    #[test]
    fn resolution_is_memoized(
        segments in arb_path(),
        slashes in 0usize..3,
        queries in 1usize..6,
    ) {
        let lookups = Arc::new(AtomicUsize::new(0));
        let table = Counting {
            inner: Router::new()
                .get("/items/{id}", Action::nullary(|| {}))
                .get(
                    "/items/{id}/parts/{part}",
                    Action::pointer(Part::default, |_: &mut Part| {}),
                ),
            lookups: Arc::clone(&lookups),
        };
        let app = App::builder(table).build();

        let path = format!("/{}{}", segments.join("/"), "/".repeat(slashes));
        let req = http::Request::get(path.as_str()).body(Bytes::new()).unwrap();
        let mut ctx = Context::new(app);
        ctx.reset(req.into(), ResponseWriter::new());

        let expected = match segments.as_slice() {
            [items, _] if items == "items" => Some("/items/{id}"),
            [items, _, parts, _] if items == "items" && parts == "parts" => {
                Some("/items/{id}/parts/{part}")
            }
            _ => None,
        };

        let first = (
            ctx.route().map(|r| r.pattern().to_owned()),
            ctx.params().clone(),
            ctx.call_args().to_vec(),
            ctx.has_action(),
        );
        prop_assert_eq!(first.0.as_deref(), expected);
        match expected {
            Some("/items/{id}") => {
                prop_assert_eq!(first.1.get("id"), Some(segments[1].as_str()));
                prop_assert!(first.2.is_empty());
                prop_assert!(!first.3);
            }
            Some(_) => {
                prop_assert_eq!(first.1.get("part"), Some(segments[3].as_str()));
                prop_assert_eq!(&first.2, &[CallArg::ReceiverRef]);
                prop_assert!(first.3);
            }
            None => {
                prop_assert!(first.1.is_empty());
            }
        }
        for _ in 0..queries {
            let again = (
                ctx.route().map(|r| r.pattern().to_owned()),
                ctx.params().clone(),
                ctx.call_args().to_vec(),
                ctx.has_action(),
            );
            prop_assert_eq!(&again, &first);
        }
        ctx.run();
        prop_assert_eq!(ctx.params(), &first.1);
        prop_assert_eq!(lookups.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn strip_never_ends_with_slash_except_root(
        segments in prop::collection::vec(arb_segment(), 0..4),
        slashes in 0usize..4,
    ) {
        let path = format!("/{}{}", segments.join("/"), "/".repeat(slashes));
        let normalized = TrailingSlash::Strip.normalize(&path);
        prop_assert!(normalized == "/" || !normalized.ends_with('/'));
        prop_assert!(path.starts_with(normalized));
        prop_assert_eq!(TrailingSlash::Strip.normalize(normalized), normalized);
    }
}
