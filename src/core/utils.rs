//! String transformation utilities for model naming

/// Converts a string to snake_case.
///
/// Handles camelCase, PascalCase, kebab-case, dotted and space-separated
/// input, converting them all to snake_case. Any other punctuation is dropped.
///
/// # Examples
/// ```
/// use swagger_modeler::core::utils::to_snake_case;
///
/// assert_eq!(to_snake_case("findPetsByStatus"), "find_pets_by_status");
/// assert_eq!(to_snake_case("FindPetsByStatus"), "find_pets_by_status");
/// assert_eq!(to_snake_case("find-pets-by-status"), "find_pets_by_status");
/// assert_eq!(to_snake_case("get HTTP Response"), "get_http_response");
/// ```
pub fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    let mut prev_is_lowercase = false;

    for (i, ch) in s.chars().enumerate() {
        if ch.is_uppercase() {
            // Underscore before an uppercase letter that follows a lowercase one
            if i > 0 && prev_is_lowercase {
                result.push('_');
            }
            result.extend(ch.to_lowercase());
            prev_is_lowercase = false;
        } else if ch.is_alphanumeric() {
            result.push(ch);
            prev_is_lowercase = ch.is_lowercase() || ch.is_ascii_digit();
        } else if matches!(ch, '-' | '_' | ' ' | '.') {
            if !result.is_empty() && !result.ends_with('_') {
                result.push('_');
            }
            prev_is_lowercase = false;
        }
    }

    // Collapse duplicate underscores and trim
    let mut final_result = String::new();
    let mut prev_underscore = false;
    for ch in result.chars() {
        if ch == '_' {
            if !prev_underscore && !final_result.is_empty() {
                final_result.push(ch);
            }
            prev_underscore = true;
        } else {
            final_result.push(ch);
            prev_underscore = false;
        }
    }

    final_result.trim_matches('_').to_string()
}

/// Converts a string to UpperCamelCase (PascalCase) for model type names.
///
/// The input is normalized through snake_case first, then every word is
/// capitalized.
///
/// # Examples
/// ```
/// use swagger_modeler::core::utils::to_proper_case;
///
/// assert_eq!(to_proper_case("find_pets_by_status"), "FindPetsByStatus");
/// assert_eq!(to_proper_case("tags"), "Tags");
/// assert_eq!(to_proper_case("date-time"), "DateTime");
/// ```
pub fn to_proper_case(s: &str) -> String {
    to_snake_case(s)
        .split('_')
        .filter(|s| !s.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
            }
        })
        .collect()
}

/// Builds the name of an anonymous type nested in `parent`.
///
/// The member is proper-cased and appended, so the result only depends on the
/// enclosing name and the member, which keeps names stable across runs.
///
/// # Examples
/// ```
/// use swagger_modeler::core::utils::nested_type_name;
///
/// assert_eq!(nested_type_name("Widget", "tags"), "WidgetTags");
/// assert_eq!(nested_type_name("WidgetTags", "Item"), "WidgetTagsItem");
/// ```
pub fn nested_type_name(parent: &str, member: &str) -> String {
    format!("{parent}{}", to_proper_case(member))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_snake_case() {
        assert_eq!(to_snake_case("findPetsByStatus"), "find_pets_by_status");
        assert_eq!(to_snake_case("FindPetsByStatus"), "find_pets_by_status");
        assert_eq!(to_snake_case("find-pets-by-status"), "find_pets_by_status");
        assert_eq!(to_snake_case("find_pets_by_status"), "find_pets_by_status");
        assert_eq!(to_snake_case("HTTPResponse"), "httpresponse");
        assert_eq!(to_snake_case("Fish.Salmon"), "fish_salmon");
        assert_eq!(to_snake_case("get HTTP Response"), "get_http_response");
    }

    #[test]
    fn test_to_proper_case() {
        assert_eq!(to_proper_case("find_pets_by_status"), "FindPetsByStatus");
        assert_eq!(to_proper_case("findPetsByStatus"), "FindPetsByStatus");
        assert_eq!(to_proper_case("FIND_PETS_BY_STATUS"), "FindPetsByStatus");
        assert_eq!(to_proper_case("red"), "Red");
        assert_eq!(to_proper_case("value1"), "Value1");
        assert_eq!(to_proper_case("*"), "");
    }

    #[test]
    fn test_nested_type_name() {
        assert_eq!(nested_type_name("Widget", "tags"), "WidgetTags");
        assert_eq!(nested_type_name("Widget", "default_program"), "WidgetDefaultProgram");
        assert_eq!(nested_type_name("PetsList", "Response"), "PetsListResponse");
    }
}
