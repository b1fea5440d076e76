//! Macros for declarative transition system construction.

/// Build a [`FeaturedTransitionSystem`](crate::core::FeaturedTransitionSystem)
/// from a declarative description.
///
/// Each state lists its transitions as `action -> target`, optionally
/// followed by `if "guard"`. Transitions without a guard always hold.
/// The macro evaluates to `Result<FeaturedTransitionSystem, BuildError>`.
///
/// # Example
///
/// ```
/// use ftsmind::fts;
///
/// let system = fts! {
///     start: state3;
///     state3 => [clean -> state5];
///     state5 => [charge -> state4 if "battery && !docked"];
///     state4 => [];
/// }
/// .unwrap();
///
/// assert_eq!(system.state_count(), 3);
/// assert_eq!(system.sinks().count(), 1);
/// ```
#[macro_export]
macro_rules! fts {
    (@guard) => {
        "true"
    };
    (@guard $guard:literal) => {
        $guard
    };
    (
        start: $start:ident;
        $(
            $state:ident => [
                $( $action:ident -> $target:ident $(if $guard:literal)? ),* $(,)?
            ];
        )*
    ) => {{
        let builder = $crate::builder::FtsBuilder::new().start(stringify!($start));
        $(
            let builder = builder.state(stringify!($state));
            $(
                let builder = builder.add(
                    stringify!($state),
                    stringify!($action),
                    stringify!($target),
                    $crate::fts!(@guard $($guard)?),
                );
            )*
        )*
        builder.build()
    }};
}
