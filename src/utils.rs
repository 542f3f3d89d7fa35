/// Declares items that are only available with the `timer` feature.
#[doc(hidden)]
macro_rules! cfg_timer {
    ($($item:item)*) => {
        $(
            #[cfg(feature = "timer")]
            #[cfg_attr(feature = "docs", doc(cfg(feature = "timer")))]
            $item
        )*
    }
}

