use crate::errors::*;

/// Split a line of source text into tokens.
///
/// Three modes: normal, inside a double-quoted string, inside a `( … )`
/// comment. Quotes are retained in string tokens so the evaluator can
/// recognize literals; comments nest and are consumed entirely; `{` and
/// `}` are always emitted standalone.
pub fn tokenize(input: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_string = false;
    let mut comment_depth = 0usize;

    for ch in input.chars() {
        if in_string {
            current.push(ch);
            if ch == '"' {
                tokens.push(std::mem::take(&mut current));
                in_string = false;
            }
            continue;
        }
        if comment_depth > 0 {
            match ch {
                '(' => comment_depth += 1,
                ')' => comment_depth -= 1,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => {
                flush(&mut tokens, &mut current);
                current.push('"');
                in_string = true;
            }
            '(' => {
                flush(&mut tokens, &mut current);
                comment_depth = 1;
            }
            ')' => return Err(ErrorKind::UnmatchedParen.into()),
            '{' => {
                flush(&mut tokens, &mut current);
                tokens.push("{".to_string());
            }
            '}' => {
                flush(&mut tokens, &mut current);
                tokens.push("}".to_string());
            }
            c if c.is_whitespace() => flush(&mut tokens, &mut current),
            c => current.push(c),
        }
    }

    if in_string {
        return Err(ErrorKind::UnmatchedQuote.into());
    }
    if comment_depth > 0 {
        return Err(ErrorKind::UnmatchedOpenParen.into());
    }
    flush(&mut tokens, &mut current);
    Ok(tokens)
}

fn flush(tokens: &mut Vec<String>, current: &mut String) {
    if !current.is_empty() {
        tokens.push(std::mem::take(current));
    }
}

/// Find the `}` matching the `{` at `start` and return the inner tokens
/// together with the index of the closing brace.
pub fn parse_block(tokens: &[String], start: usize) -> Result<(Vec<String>, usize)> {
    if tokens.get(start).map(String::as_str) != Some("{") {
        return Err(ErrorKind::ExpectedOpenBrace.into());
    }
    let mut depth = 1;
    for j in start + 1..tokens.len() {
        match tokens[j].as_str() {
            "{" => depth += 1,
            "}" => {
                depth -= 1;
                if depth == 0 {
                    return Ok((tokens[start + 1..j].to_vec(), j));
                }
            }
            _ => {}
        }
    }
    Err(ErrorKind::UnmatchedBrace.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(input: &str) -> Vec<String> {
        tokenize(input).unwrap()
    }

    #[test]
    fn whitespace_separates_tokens() {
        assert_eq!(toks("2 3  +"), vec!["2", "3", "+"]);
        assert_eq!(toks("  "), Vec::<String>::new());
    }

    #[test]
    fn quote_safety() {
        // a quoted string becomes exactly one token with the quotes retained
        assert_eq!(toks("\"hello world\""), vec!["\"hello world\""]);
        assert_eq!(toks("1 \"a b c\" 2"), vec!["1", "\"a b c\"", "2"]);
        assert_eq!(toks("\"\""), vec!["\"\""]);
    }

    #[test]
    fn braces_are_standalone() {
        assert_eq!(toks("{dup *}"), vec!["{", "dup", "*", "}"]);
        assert_eq!(toks("{ { } }"), vec!["{", "{", "}", "}"]);
    }

    #[test]
    fn comments_are_consumed() {
        assert_eq!(toks("1 ( such comment ) 2"), vec!["1", "2"]);
        assert_eq!(toks("1 ( nested ( deeper ) still ) 2"), vec!["1", "2"]);
        assert_eq!(toks("( only a comment )"), Vec::<String>::new());
    }

    #[test]
    fn parens_inside_strings_are_literal() {
        assert_eq!(toks("\"( not a comment )\""), vec!["\"( not a comment )\""]);
    }

    #[test]
    fn unmatched_quote_is_an_error() {
        let err = tokenize("\"oops").unwrap_err();
        assert_eq!(err.code(), 36);
    }

    #[test]
    fn unmatched_parens_are_errors() {
        assert_eq!(tokenize("1 )").unwrap_err().code(), 35);
        assert_eq!(tokenize("1 ( open").unwrap_err().code(), 37);
    }

    #[test]
    fn block_round_trip() {
        let tokens = toks("{ 1 2 + }");
        let (inner, end) = parse_block(&tokens, 0).unwrap();
        assert_eq!(inner, vec!["1", "2", "+"]);
        assert_eq!(end, tokens.len() - 1);
    }

    #[test]
    fn nested_block_capture() {
        let tokens = toks("{ a { b } c } d");
        let (inner, end) = parse_block(&tokens, 0).unwrap();
        assert_eq!(inner, vec!["a", "{", "b", "}", "c"]);
        assert_eq!(tokens[end + 1], "d");
    }

    #[test]
    fn unmatched_brace_is_an_error() {
        let tokens = toks("{ 1 2");
        assert_eq!(parse_block(&tokens, 0).unwrap_err().code(), 39);
    }
}
