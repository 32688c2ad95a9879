//! Trybuild fixture covering callable and type-erased fields.

#[optgen::generate]
mod hooks {
    use std::fmt::Debug;
    use std::rc::Rc;
    use std::sync::Arc;

    pub fn seven() -> i32 {
        7
    }

    #[options(public = true)]
    pub struct Hooks {
        #[options = ",seven"]
        pub compute: fn() -> i32,
        pub handler: Option<Arc<dyn Fn(i32) -> i32 + Send + Sync>>,
        pub label: Option<Rc<dyn Debug>>,
        #[options = "-"]
        pub owned: Option<Box<dyn Fn() -> i32>>,
    }

    /// Bare callables need no seed without a build function.
    #[options(new = false)]
    pub struct Unseeded {
        pub callback: fn() -> i32,
        pub shared: Arc<dyn Fn() -> i32>,
    }
}

fn main() {
    use std::sync::Arc;

    use hooks::{HooksOptions, Unseeded, UnseededOptions, apply_unseeded_options, new_hooks};

    let handler = HooksOptions::handler(Some(Arc::new(|value: i32| value * 2)));
    assert_eq!(handler.to_string(), "Handler: <func>");
    let built = match new_hooks(&[&handler]) {
        Ok(built) => built,
        Err(err) => panic!("{err}"),
    };
    assert_eq!((built.compute)(), 7);
    assert!(built.handler.is_some_and(|handler| handler(4) == 8));
    assert!(built.label.is_none());
    assert!(built.owned.is_none());

    let mut unseeded = Unseeded {
        callback: hooks::seven,
        shared: Arc::new(|| 1),
    };
    let shared = UnseededOptions::shared(Arc::new(|| 2));
    if let Err(err) = apply_unseeded_options(&mut unseeded, &[&shared, &shared.clone()]) {
        panic!("{err}");
    }
    assert_eq!((unseeded.shared)(), 2);
    assert_eq!((unseeded.callback)(), 7);
}
