//! Signup flow example demonstrating the runtime end to end.
//!
//! A signup form keeps its draft in a scoped store, its screens on a
//! navigation stack mirrored to the (fake) platform history, and routes
//! with the awaitable router:
//!
//! 1. Fill in a field, walk two steps forward
//! 2. Press the platform back button once
//! 3. Navigate away and await the landing
//! 4. Sign out, purging the whole flow scope

use serde_json::{json, Map};

use scopestack::{
    fake_platform, LocationSource, Runtime, RuntimeConfig, StackConfig, StoreConfig,
};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let (platform, history, location) = fake_platform();
    let runtime = Runtime::new(RuntimeConfig::default(), platform).expect("memory runtime");

    // One store in the signup_flow scope, persisted for the session.
    let signup = runtime
        .use_stack(
            "signup_flow",
            "signup",
            StoreConfig::new(json!({"fullName": "", "email": ""}))
                .persist(true)
                .method("set_field", |mut state, args| {
                    if let (Some(obj), Some(field), Some(value)) = (
                        state.as_object_mut(),
                        args.first().and_then(serde_json::Value::as_str),
                        args.get(1),
                    ) {
                        obj.insert(field.to_string(), value.clone());
                    }
                    state
                }),
        )
        .expect("signup store");

    signup
        .mutate("set_field", &[json!("fullName"), json!("Ada Lovelace")])
        .expect("set_field is registered");
    println!("draft: {}", signup.state());

    // One stack for the signup screens, mirrored onto the history.
    let nav = runtime
        .use_nav(
            "signup",
            StackConfig::new("step1")
                .screen("step2")
                .screen("confirm")
                .sync_history(true),
        )
        .expect("signup stack");

    nav.push("step2", Map::new()).expect("step2 is linked");
    nav.push("confirm", Map::new()).expect("confirm is linked");
    println!("top of stack: {}", nav.peek().name);

    // The user presses the platform back button.
    let marker = history.back_gesture("signup");
    runtime.handle_history_pop(&marker);
    println!("after back gesture: {}", nav.peek().name);

    // Leave the flow; the future resolves when the location is observed.
    runtime
        .router()
        .push_and_wait("/missions")
        .await
        .expect("navigation lands");
    println!("location: {}", location.current());

    // Sign out: every flow scope is purged, awaited to completion.
    runtime.clear_scope("signup_flow").expect("scope cleared");
    let fresh = runtime
        .use_stack(
            "signup_flow",
            "signup",
            StoreConfig::new(json!({"fullName": "", "email": ""})),
        )
        .expect("signup store");
    println!("after sign-out: {}", fresh.state());
}
