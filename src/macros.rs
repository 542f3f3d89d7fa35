/// Waits for several sources to settle, optionally finalizing their outcomes.
///
/// Every argument is converted with [`Source::from`], so it can be a [`Source`], a
/// [`Promise`] or a `Result`. A trailing `=> finalize` hands the outcomes to a callback, as
/// [`when_with`] does; without it the macro behaves like [`when`].
///
/// The macro evaluates to `Result<Promise<_, _>, ArgumentError>`.
///
/// [`Source::from`]: future/enum.Source.html
/// [`Source`]: future/enum.Source.html
/// [`Promise`]: future/struct.Promise.html
/// [`when_with`]: future/fn.when_with.html
/// [`when`]: future/fn.when.html
///
/// # Examples
///
/// ```
/// # async_when::task::block_on(async {
/// #
/// use async_when::future::{Promise, Source};
/// use async_when::when;
///
/// let done = when!(Ok::<_, &str>(5), Err("x")).unwrap();
/// assert_eq!(done.await, Ok(()));
///
/// let sum = when!(Promise::<i32, ()>::resolved(1), Ok(2) => |results, _errors| {
///     let sum: i32 = results.into_iter().flatten().sum();
///     Ok::<_, ()>(Source::value(sum))
/// })
/// .unwrap();
/// assert_eq!(sum.await, Ok(3));
/// #
/// # })
/// ```
#[macro_export]
macro_rules! when {
    ($($source:expr),+ $(,)? => $finalize:expr) => {
        $crate::future::when_with(
            ::std::vec![$($crate::future::Source::from($source)),+],
            $finalize,
        )
    };
    ($($source:expr),+ $(,)?) => {
        $crate::future::when(::std::vec![$($crate::future::Source::from($source)),+])
    };
}
