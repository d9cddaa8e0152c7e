/// Generate accessors for the shared UI signals.
///
/// Usage:
/// `global_signals! {
///     pub status_signal => status: String,
///     settings_signal => settings: Settings,
/// }`
#[macro_export]
macro_rules! global_signals {
    ( $( $vis:vis $name:ident => $field:ident : $ty:ty ),+ $(,)? ) => {
        $(
            $vis fn $name() -> ::leptos::RwSignal<$ty> {
                $crate::global_state::globals().$field
            }
        )+
    };
}
