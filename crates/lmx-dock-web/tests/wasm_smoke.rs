#![cfg(target_arch = "wasm32")]
#![forbid(unsafe_code)]

use js_sys::{Function, Object, Reflect};
use lmx_dock::{DOCK_SPACE_PROPERTY, VIEWPORT_BOTTOM_OFFSET_PROPERTY};
use lmx_dock_web::AdaptiveDock;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};
use web_sys::HtmlElement;

wasm_bindgen_test_configure!(run_in_browser);

fn root_property(name: &str) -> String {
    web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.document_element())
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        .and_then(|el| el.style().get_property_value(name).ok())
        .unwrap_or_default()
}

fn payload(entries: &[(&str, JsValue)]) -> JsValue {
    let obj = Object::new();
    for (key, value) in entries {
        Reflect::set(&obj, &JsValue::from_str(key), value).expect("set field");
    }
    obj.into()
}

fn widget() -> JsValue {
    Function::new_no_args("return null;").into()
}

#[wasm_bindgen_test]
fn construct_publishes_zeroed_properties() {
    let dock = AdaptiveDock::new(None, None).expect("dock");
    assert!(dock.ready());
    assert_eq!(root_property(DOCK_SPACE_PROPERTY), "0px");
    assert_eq!(root_property(VIEWPORT_BOTTOM_OFFSET_PROPERTY), "0px");
    dock.destroy();
    assert!(!dock.ready());
}

#[wasm_bindgen_test]
fn registry_calls_reach_composition() {
    let dock = AdaptiveDock::new(None, None).expect("dock");
    dock.upsert_cta("chat", payload(&[("render", widget())]))
        .expect("cta payload");
    dock.upsert_nav(
        "menu",
        payload(&[("renderFull", widget()), ("priority", JsValue::from_f64(2.0))]),
    )
    .expect("nav payload");

    let plan = dock.composition();
    let visible = Reflect::get(&plan, &"visible".into())
        .ok()
        .and_then(|v| v.as_bool());
    assert_eq!(visible, Some(dock.is_mobile()));

    dock.set_suspended("sheet", true, payload(&[("keepNavOpen", JsValue::TRUE)]))
        .expect("suspend");
    assert!(dock.is_suspended());
    dock.clear_suspended("sheet");
    assert!(!dock.is_suspended());
}

#[wasm_bindgen_test]
fn malformed_payloads_are_errors() {
    let dock = AdaptiveDock::new(None, None).expect("dock");
    assert!(dock.upsert_cta("chat", payload(&[])).is_err());
    assert!(
        dock.upsert_nav("menu", payload(&[("renderFull", JsValue::from_str("nope"))]))
            .is_err()
    );
    assert!(dock.push_encoded_event("not json").is_err());
    assert_eq!(
        dock.push_encoded_event(r#"{"kind":"dock_height","px":40}"#)
            .ok(),
        Some(false)
    );
}

#[wasm_bindgen_test]
fn subscribers_hear_plan_changes() {
    let dock = AdaptiveDock::new(None, None).expect("dock");
    let counter = Object::new();
    Reflect::set(&counter, &"n".into(), &JsValue::from_f64(0.0)).expect("init counter");
    let callback = Function::new_with_args("", "this.n = this.n + 1;")
        .bind(&counter);
    let id = dock.subscribe(callback);

    dock.push_encoded_event(r#"{"kind":"media","mobile":true}"#)
        .expect("media");
    dock.upsert_cta("chat", payload(&[("render", widget())]))
        .expect("cta payload");
    let calls = Reflect::get(&counter, &"n".into())
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or_default();
    assert!(calls >= 1.0);
    assert!(dock.unsubscribe(id));
    assert!(!dock.unsubscribe(id));
}
