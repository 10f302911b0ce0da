//! Type string parsing utilities.
//!
//! Turns Move type strings (`u64`, `vector<u8>`, `0x2::coin::Coin<0x2::sui::SUI>`)
//! into [`TypeTag`]s, and splits `package::module::function` call targets.

use sui_bcs::MAX_NESTING_DEPTH;

use crate::address::SuiAddress;
use crate::error::TypeParseError;
use crate::type_tag::{StructTag, TypeTag};

/// Parse a Move type string into a TypeTag.
///
/// Supports:
/// - Primitive types: `bool`, `u8`, `u16`, `u32`, `u64`, `u128`, `u256`, `address`, `signer`
/// - Vector types: `vector<T>`
/// - Struct types: `0x2::module::Struct` or `0x2::module::Struct<T1, T2>`
///
/// Vectors and structs may nest at most [`MAX_NESTING_DEPTH`] levels, the
/// same bound the binary decoder enforces.
///
/// # Examples
///
/// ```
/// use sui_ptb_types::parse_type_tag;
///
/// let tag = parse_type_tag("0x2::coin::Coin<0x2::sui::SUI>").unwrap();
/// assert_eq!(tag.to_string(), "0x2::coin::Coin<0x2::sui::SUI>");
/// ```
pub fn parse_type_tag(type_str: &str) -> Result<TypeTag, TypeParseError> {
    parse_type_tag_at(type_str, 0)
}

fn parse_type_tag_at(type_str: &str, depth: usize) -> Result<TypeTag, TypeParseError> {
    let type_str = type_str.trim();
    if type_str.is_empty() {
        return Err(TypeParseError::Empty);
    }

    match type_str {
        "bool" => return Ok(TypeTag::Bool),
        "u8" => return Ok(TypeTag::U8),
        "u16" => return Ok(TypeTag::U16),
        "u32" => return Ok(TypeTag::U32),
        "u64" => return Ok(TypeTag::U64),
        "u128" => return Ok(TypeTag::U128),
        "u256" => return Ok(TypeTag::U256),
        "address" => return Ok(TypeTag::Address),
        "signer" => return Ok(TypeTag::Signer),
        _ => {}
    }

    if depth >= MAX_NESTING_DEPTH {
        return Err(TypeParseError::TooDeep {
            limit: MAX_NESTING_DEPTH,
        });
    }

    if let Some(rest) = type_str.strip_prefix("vector<") {
        let inner = rest
            .strip_suffix('>')
            .ok_or_else(|| TypeParseError::UnbalancedBrackets(type_str.to_string()))?;
        return Ok(TypeTag::vector(parse_type_tag_at(inner, depth + 1)?));
    }

    // 0x<address>::<module>::<name><type_args>
    let (base_type, type_args_str) = match type_str.find('<') {
        Some(angle_pos) => (&type_str[..angle_pos], Some(&type_str[angle_pos..])),
        None => (type_str, None),
    };

    let (address, module, name) = split_path(base_type)?;

    let type_params = match type_args_str {
        Some(args_str) => parse_type_args(args_str, depth + 1)?,
        None => vec![],
    };

    Ok(StructTag {
        address,
        module,
        name,
        type_params,
    }
    .into())
}

/// Parse type arguments string like "<T1, T2, T3>".
fn parse_type_args(args_str: &str, depth: usize) -> Result<Vec<TypeTag>, TypeParseError> {
    let inner = args_str
        .strip_prefix('<')
        .and_then(|s| s.strip_suffix('>'))
        .ok_or_else(|| TypeParseError::UnbalancedBrackets(args_str.to_string()))?;
    if !brackets_balanced(inner) {
        return Err(TypeParseError::UnbalancedBrackets(args_str.to_string()));
    }
    if inner.trim().is_empty() {
        return Ok(vec![]);
    }
    split_type_params(inner)
        .into_iter()
        .map(|param| parse_type_tag_at(param, depth))
        .collect()
}

fn brackets_balanced(s: &str) -> bool {
    let mut depth: i32 = 0;
    for c in s.chars() {
        match c {
            '<' => depth += 1,
            '>' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

/// Split type parameters respecting nested angle brackets.
///
/// Given "A, B<C, D>, E", returns ["A", "B<C, D>", "E"] by tracking bracket depth.
pub fn split_type_params(s: &str) -> Vec<&str> {
    let mut result = Vec::new();
    let mut depth = 0;
    let mut start = 0;

    for (i, c) in s.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth -= 1,
            ',' if depth == 0 => {
                result.push(s[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }

    if start < s.len() {
        result.push(s[start..].trim());
    }

    result
}

/// Split `0x2::coin::split` into `(0x2, "coin", "split")`.
///
/// ```
/// use sui_ptb_types::parse_function_target;
///
/// let (package, module, function) = parse_function_target("0x2::coin::split").unwrap();
/// assert_eq!(package.to_short_string(), "0x2");
/// assert_eq!((module.as_str(), function.as_str()), ("coin", "split"));
/// ```
pub fn parse_function_target(target: &str) -> Result<(SuiAddress, String, String), TypeParseError> {
    let target = target.trim();
    if target.is_empty() {
        return Err(TypeParseError::Empty);
    }
    split_path(target)
}

fn split_path(path: &str) -> Result<(SuiAddress, String, String), TypeParseError> {
    let parts: Vec<&str> = path.split("::").map(str::trim).collect();
    let [address_str, module, name] = parts.as_slice() else {
        return Err(TypeParseError::MalformedPath(path.to_string()));
    };
    let address =
        SuiAddress::from_hex_literal(address_str).map_err(|source| TypeParseError::Address {
            input: path.to_string(),
            source,
        })?;
    Ok((address, identifier(module)?, identifier(name)?))
}

/// Move identifiers: `[A-Za-z_][A-Za-z0-9_]*`, and not a lone underscore.
fn identifier(s: &str) -> Result<String, TypeParseError> {
    let mut chars = s.chars();
    let valid = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => true,
        Some('_') => s.len() > 1,
        _ => false,
    } && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(s.to_string())
    } else {
        Err(TypeParseError::Identifier(s.to_string()))
    }
}
