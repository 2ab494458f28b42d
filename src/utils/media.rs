use dioxus::prelude::*;

/// Shared colour-scheme flag, provided once by the main page.
#[derive(Clone, Copy, PartialEq)]
pub struct DarkMode(pub Signal<bool>);

impl DarkMode {
    pub fn is_dark(&self) -> bool {
        *self.0.read()
    }
}

/// Tracks a CSS media query. Starts at `default` and follows the browser
/// once mounted; the listener is removed on unmount.
pub fn use_media_query(query: &'static str, default: bool) -> Signal<bool> {
    let matches = use_signal(|| default);

    #[cfg(feature = "web")]
    {
        use wasm_bindgen::closure::Closure;
        use wasm_bindgen::JsCast;
        use web_sys::{MediaQueryList, MediaQueryListEvent};

        type Listener = (MediaQueryList, Closure<dyn FnMut(MediaQueryListEvent)>);
        let listener: Signal<Option<Listener>> = use_signal(|| None);

        use_drop({
            let mut listener = listener.clone();
            move || {
                if let Some((mql, cb)) = listener.write().take() {
                    let _ = mql
                        .remove_event_listener_with_callback("change", cb.as_ref().unchecked_ref());
                }
            }
        });

        use_effect({
            let mut matches = matches.clone();
            let mut listener = listener.clone();
            move || {
                let Some(window) = web_sys::window() else {
                    return;
                };
                let mql = match window.match_media(query) {
                    Ok(Some(mql)) => mql,
                    _ => {
                        dioxus::logger::tracing::warn!("[media] unsupported query {query}");
                        return;
                    }
                };
                matches.set(mql.matches());

                let cb = Closure::<dyn FnMut(MediaQueryListEvent)>::new(
                    move |e: MediaQueryListEvent| matches.set(e.matches()),
                );
                if mql
                    .add_event_listener_with_callback("change", cb.as_ref().unchecked_ref())
                    .is_ok()
                {
                    listener.set(Some((mql, cb)));
                }
            }
        });
    }

    matches
}

pub fn use_prefers_dark() -> Signal<bool> {
    use_media_query("(prefers-color-scheme: dark)", false)
}
