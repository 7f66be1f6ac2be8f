//! Generated bindings compiled against the runtime.
//!
//! `build.rs` runs the generator on a small interface; the output is included here verbatim next to the
//! implementation type it forwards to, so every type the generator emits has to check against the runtime and
//! against the declared host types.

pub mod widget {
    #![allow(unused_variables, unused_mut, unreachable_code, clippy::all)]

    include!(concat!(env!("OUT_DIR"), "/widget_bindings.rs"));

    use std::cell::{Cell, RefCell};

    thread_local! {
        static MODE: Cell<Mode> = const { Cell::new(Mode::Open) };
        static LAST_OPTIONS: RefCell<Option<Options>> = const { RefCell::new(None) };
    }

    /// Implementation behind `WidgetPrototype`.
    pub struct Widget;

    impl Widget {
        /// Records the converted dictionary and hands it back unchanged.
        pub fn echo(realm: &mut Realm, imp: &Handle<Widget>, options: Options) -> ThrowCompletionOr<Options> {
            LAST_OPTIONS.with(|last| *last.borrow_mut() = Some(options.clone()));
            Ok(options)
        }

        pub fn mode(realm: &mut Realm, imp: &Handle<Widget>) -> ThrowCompletionOr<Mode> {
            Ok(MODE.with(Cell::get))
        }

        pub fn set_mode(realm: &mut Realm, imp: &Handle<Widget>, mode: Mode) -> ThrowCompletionOr<()> {
            MODE.with(|current| current.set(mode));
            Ok(())
        }

        /// The dictionary the last `echo` call received on this thread.
        pub fn last_options() -> Option<Options> {
            LAST_OPTIONS.with(|last| last.borrow().clone())
        }
    }
}
