//! Partial updates distinguish "leave unchanged" from "clear".
//!
//! `Option<Option<T>>` fields use [`double_option`]: an absent key is
//! `None`, an explicit `null` is `Some(None)`, a value is `Some(Some(v))`.

use serde::{Deserialize, Deserializer};

/// Deserializes an explicitly present key into `Some`, keeping `null` as `Some(None)`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Applies a plain optional patch value.
pub fn apply<T: Clone>(target: &mut T, value: &Option<T>) {
    if let Some(value) = value {
        *target = value.clone();
    }
}

/// Applies a clearable optional patch value.
pub fn apply_nullable<T: Clone>(target: &mut Option<T>, value: &Option<Option<T>>) {
    if let Some(value) = value {
        *target = value.clone();
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::{apply_nullable, double_option};

    #[derive(Deserialize)]
    struct Sample {
        #[serde(default, deserialize_with = "double_option")]
        website: Option<Option<String>>,
    }

    #[test]
    fn distinguishes_absent_null_and_value() -> Result<(), serde_json::Error> {
        let absent: Sample = serde_json::from_str("{}")?;
        let cleared: Sample = serde_json::from_str(r#"{"website":null}"#)?;
        let set: Sample = serde_json::from_str(r#"{"website":"https://a.es"}"#)?;

        assert_eq!(absent.website, None);
        assert_eq!(cleared.website, Some(None));
        assert_eq!(set.website, Some(Some("https://a.es".to_owned())));

        let mut target = Some("old".to_owned());
        apply_nullable(&mut target, &cleared.website);
        assert_eq!(target, None);
        Ok(())
    }
}
