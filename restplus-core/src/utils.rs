//! Small naming helpers shared by the builder and the documentation generator.

/// Convert a CamelCase name into snake_case.
///
/// Runs of capitals are kept together: `HTTPResponse` becomes `http_response`.
pub fn camel_to_dash(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1).copied();
            let boundary = match prev {
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_uppercase() => next.is_some_and(char::is_lowercase),
                _ => false,
            };
            if boundary && !out.ends_with('_') {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Default operation id: `{method}_{snake_case(resource)}`.
pub fn default_id(resource: &str, method: &str) -> String {
    format!("{}_{}", method.to_lowercase(), camel_to_dash(resource))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camel_case_is_split() {
        assert_eq!(camel_to_dash("TodoList"), "todo_list");
        assert_eq!(camel_to_dash("Todo"), "todo");
        assert_eq!(camel_to_dash("HTTPResponse"), "http_response");
        assert_eq!(camel_to_dash("already_snake"), "already_snake");
    }

    #[test]
    fn default_operation_id() {
        assert_eq!(default_id("TodoList", "GET"), "get_todo_list");
    }
}
