// Notice identity and date normalization
//
// Every id has the shape `<tag>-<postId>` where the tag is
// `<provider>_<category>`. Providers contain neither `_` nor `-` and category
// keys contain no `-`, so the first `_` and the first `-` recover both parts
// and distinct posts never share an id.

use crate::errors::FetchError;
use crate::models::DateFormat;
use chrono::NaiveDate;
use regex::Regex;
use reqwest::Url;

/// Query parameters bulletin boards use for the post number, most specific first
const POST_ID_PARAMS: &[&str] = &["articleNo", "nttSn", "bbsIdx", "idx", "seq", "no", "id"];

lazy_static::lazy_static! {
    /// Base for site-relative listing links
    static ref RELATIVE_BASE: Url =
        Url::parse("http://listing.invalid/").expect("relative base is a valid URL");
    static ref FULL_DATE: Regex =
        Regex::new(r"(\d{4})\s*[.\-/]\s*(\d{1,2})\s*[.\-/]\s*(\d{1,2})").expect("date pattern is valid");
    static ref SHORT_DATE: Regex =
        Regex::new(r"^\s*(\d{2})\.(\d{1,2})\.(\d{1,2})\.?\s*$").expect("short date pattern is valid");
}

/// Extract the post number from a listing link
///
/// The first parameter of `POST_ID_PARAMS` present in the query wins,
/// whatever its position; its whole value is taken, percent-decoded.
/// Otherwise the last path segment is used when it is all digits.
pub fn extract_post_id(link: &str) -> Result<String, FetchError> {
    let url = Url::parse(link)
        .or_else(|_| RELATIVE_BASE.join(link))
        .map_err(|_| FetchError::InvalidPostUrl(link.to_string()))?;

    let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    for param in POST_ID_PARAMS {
        if let Some((_, value)) = pairs.iter().find(|(key, _)| key == param) {
            if value.is_empty() {
                return Err(FetchError::InvalidPostUrl(link.to_string()));
            }
            return Ok(value.clone());
        }
    }

    url.path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .filter(|segment| segment.chars().all(|c| c.is_ascii_digit()))
        .map(str::to_string)
        .ok_or_else(|| FetchError::InvalidPostUrl(link.to_string()))
}

/// Id prefix of one board: boards of a family number their posts independently
pub fn source_tag(provider: &str, category: &str) -> String {
    format!("{}_{}", provider, category.to_ascii_lowercase())
}

/// Build the store-wide id of a post: `<tag>-<postId>`
pub fn notice_id(tag: &str, link: &str) -> Result<String, FetchError> {
    let post_id = extract_post_id(link)?;
    Ok(format!("{}-{}", tag, post_id))
}

/// Normalize a listing date into `format`
///
/// Accepts `YYYY.MM.DD`, `YYYY-MM-DD`, `YYYY/MM/DD` (optionally followed by a
/// time) and the two-digit-year `YY.MM.DD` some boards print.
pub fn normalize_date(raw: &str, format: DateFormat) -> Result<String, FetchError> {
    let (year, month, day) = if let Some(c) = FULL_DATE.captures(raw) {
        (parse_part(&c[1], raw)?, parse_part(&c[2], raw)?, parse_part(&c[3], raw)?)
    } else if let Some(c) = SHORT_DATE.captures(raw) {
        (
            2000 + parse_part(&c[1], raw)?,
            parse_part(&c[2], raw)?,
            parse_part(&c[3], raw)?,
        )
    } else {
        return Err(FetchError::InvalidDate(raw.to_string()));
    };

    let date = NaiveDate::from_ymd_opt(year as i32, month, day)
        .ok_or_else(|| FetchError::InvalidDate(raw.to_string()))?;
    Ok(date.format(format.pattern()).to_string())
}

fn parse_part(part: &str, raw: &str) -> Result<u32, FetchError> {
    part.parse()
        .map_err(|_| FetchError::InvalidDate(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_from_query_parameter() {
        let link = "https://www.univ.ac.kr/bbs/view.do?bbsId=12&articleNo=48213&mode=view";
        assert_eq!(extract_post_id(link).unwrap(), "48213");
    }

    #[test]
    fn test_extract_from_ntt_sn() {
        let link = "https://cse.univ.ac.kr/board/view?nttSn=991";
        assert_eq!(extract_post_id(link).unwrap(), "991");
    }

    #[test]
    fn test_board_id_parameter_is_not_the_post_id() {
        // `bbsId` must not be mistaken for `id`
        let link = "https://www.univ.ac.kr/bbs/view.do?bbsId=12&seq=7";
        assert_eq!(extract_post_id(link).unwrap(), "7");
    }

    #[test]
    fn test_extract_from_numeric_path_segment() {
        let link = "https://library.univ.ac.kr/notices/1203";
        assert_eq!(extract_post_id(link).unwrap(), "1203");
        let link = "https://library.univ.ac.kr/notices/1203/";
        assert_eq!(extract_post_id(link).unwrap(), "1203");
    }

    #[test]
    fn test_extract_rejects_link_without_post_number() {
        let result = extract_post_id("https://library.univ.ac.kr/notices/latest");
        assert!(matches!(result, Err(FetchError::InvalidPostUrl(_))));
    }

    #[test]
    fn test_whole_parameter_value_is_kept() {
        let first = extract_post_id("https://cse.univ.ac.kr/view?articleNo=2025-001").unwrap();
        let second = extract_post_id("https://cse.univ.ac.kr/view?articleNo=2025-002").unwrap();
        assert_eq!(first, "2025-001");
        assert_eq!(second, "2025-002");
    }

    #[test]
    fn test_parameter_value_is_percent_decoded() {
        let link = "https://www.univ.ac.kr/bbs/view.do?seq=A%2F17.3&mode=view#top";
        assert_eq!(extract_post_id(link).unwrap(), "A/17.3");
    }

    #[test]
    fn test_parameter_priority_ignores_query_position() {
        let first = extract_post_id("https://cse.univ.ac.kr/view?id=3&articleNo=100").unwrap();
        let second = extract_post_id("https://cse.univ.ac.kr/view?id=3&articleNo=200").unwrap();
        assert_eq!(first, "100");
        assert_eq!(second, "200");
    }

    #[test]
    fn test_empty_parameter_value_is_rejected() {
        let result = extract_post_id("https://cse.univ.ac.kr/view?articleNo=&id=4");
        assert!(matches!(result, Err(FetchError::InvalidPostUrl(_))));
    }

    #[test]
    fn test_relative_link() {
        assert_eq!(extract_post_id("/board/view?nttSn=55").unwrap(), "55");
        assert_eq!(extract_post_id("notices/812").unwrap(), "812");
    }

    #[test]
    fn test_notice_id_shape() {
        let tag = source_tag("dept", "CSE");
        let id = notice_id(&tag, "https://cse.univ.ac.kr/board/view?articleNo=1").unwrap();
        assert_eq!(id, "dept_cse-1");
    }

    #[test]
    fn test_normalize_date_variants() {
        assert_eq!(normalize_date("2025.03.10", DateFormat::Dotted).unwrap(), "2025.03.10");
        assert_eq!(normalize_date("2025-3-9", DateFormat::Dotted).unwrap(), "2025.03.09");
        assert_eq!(normalize_date("2025/03/10 14:22", DateFormat::Dashed).unwrap(), "2025-03-10");
        assert_eq!(normalize_date("25.03.10", DateFormat::Dashed).unwrap(), "2025-03-10");
        assert_eq!(normalize_date(" 2025. 03. 10 ", DateFormat::Dotted).unwrap(), "2025.03.10");
    }

    #[test]
    fn test_normalize_date_rejects_garbage() {
        assert!(matches!(
            normalize_date("yesterday", DateFormat::Dotted),
            Err(FetchError::InvalidDate(_))
        ));
        assert!(matches!(
            normalize_date("2025.02.30", DateFormat::Dotted),
            Err(FetchError::InvalidDate(_))
        ));
    }
}
