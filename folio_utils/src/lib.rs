mod macros;

pub trait Apply {
    /// Applies the function `f` only if `value` is `Some(...)` and provides the
    /// contained value to `f`.
    ///
    /// #### Example
    /// ```rust
    /// # use folio_utils::Apply;
    /// fn reply_to(subject: String, name: Option<&str>) -> String {
    ///     subject.apply_map(name, |s, name| format!("{s} from {name}"))
    /// }
    /// assert_eq!(reply_to("Hello".into(), None), "Hello");
    /// assert_eq!(reply_to("Hello".into(), Some("Jane")), "Hello from Jane");
    /// ```
    fn apply_map<U>(self, value: Option<U>, f: impl FnOnce(Self, U) -> Self) -> Self
    where
        Self: Sized,
    {
        match value {
            Some(value) => f(self, value),
            None => self,
        }
    }
}

impl<T> Apply for T {}
