/// Whether the first character is an uppercase letter.
///
/// QML uses this single predicate to tell type names (`Item`, `Keys`) from
/// property names (`item`, `anchors`). Non-letters are never uppercase.
///
/// # Examples
/// ```
/// use qmlc_core::utils::starts_uppercase;
/// assert!(starts_uppercase("Item"));
/// assert!(!starts_uppercase("item"));
/// assert!(!starts_uppercase("_Item"));
/// ```
pub fn starts_uppercase(s: &str) -> bool {
    s.chars().next().is_some_and(char::is_uppercase)
}

/// Whether `name` has the lexical shape of a signal handler: `on`, then any
/// number of underscores, then an uppercase letter.
///
/// Whether such a signal actually exists is decided later, against the
/// resolved type; this only looks at the spelling.
///
/// # Examples
/// ```
/// use qmlc_core::utils::is_signal_handler_name;
/// assert!(is_signal_handler_name("onClicked"));
/// assert!(is_signal_handler_name("on__Done"));
/// assert!(!is_signal_handler_name("onclicked"));
/// assert!(!is_signal_handler_name("on__"));
/// ```
pub fn is_signal_handler_name(name: &str) -> bool {
    let Some(rest) = name.strip_prefix("on") else {
        return false;
    };
    rest.chars()
        .find(|&c| c != '_')
        .is_some_and(char::is_uppercase)
}

/// Why an `id:` value was rejected.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum IdShapeError {
    Empty,
    StartsUppercase,
    BadStart,
    BadChar,
}

/// Check the `[a-z_][A-Za-z0-9_]*` shape of an object id (letters may be any
/// Unicode letter, as long as the first one is lowercase).
pub fn check_id_shape(id: &str) -> Result<(), IdShapeError> {
    let mut chars = id.chars();
    let Some(first) = chars.next() else {
        return Err(IdShapeError::Empty);
    };
    if first.is_alphabetic() && !first.is_lowercase() {
        return Err(IdShapeError::StartsUppercase);
    }
    if !first.is_alphabetic() && first != '_' {
        return Err(IdShapeError::BadStart);
    }
    if chars.any(|c| !c.is_alphanumeric() && c != '_') {
        return Err(IdShapeError::BadChar);
    }
    Ok(())
}

/// Split a dotted version literal (`2`, `2.15`) into major/minor.
///
/// A missing minor defaults to 0 and unparseable components read as 0. An
/// empty string yields (-1, -1), the "unspecified" version.
pub fn parse_version(text: &str) -> (i32, i32) {
    if text.is_empty() {
        return (-1, -1);
    }
    let component = |s: &str| s.trim().parse::<i32>().unwrap_or(0);
    match text.split_once('.') {
        None => (component(text), 0),
        Some((major, minor)) => (component(major), component(minor)),
    }
}
