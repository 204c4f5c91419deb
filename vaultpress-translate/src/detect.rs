//! Script-ratio language detection for post bodies.

use regex::Regex;
use std::sync::OnceLock;

/// Markup stripped before counting, applied in order with its replacement.
fn cleaning_rules() -> &'static [(Regex, &'static str)] {
    static RULES: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    RULES.get_or_init(|| {
        [
            (r"(?s)```.*?```", ""),
            (r"`[^`]+`", ""),
            (r"\[([^\]]+)\]\([^)]+\)", "$1"),
            (r"!\[\[.*?\]\]", ""),
            (r"\[\[.*?\]\]", ""),
            (r"#+\s*", ""),
            (r"[*_~`#>\-|]", ""),
            (r"https?://\S+", ""),
            (r"\s+", " "),
        ]
        .into_iter()
        .map(|(pattern, replacement)| (Regex::new(pattern).expect("valid regex"), replacement))
        .collect()
    })
}

fn clean_text(text: &str) -> String {
    let cleaned = cleaning_rules()
        .iter()
        .fold(text.to_string(), |acc, (re, replacement)| {
            re.replace_all(&acc, *replacement).into_owned()
        });
    cleaned.trim().to_string()
}

fn is_hangul(c: char) -> bool {
    matches!(c, '\u{AC00}'..='\u{D7AF}' | '\u{1100}'..='\u{11FF}' | '\u{3130}'..='\u{318F}')
}

fn is_kana(c: char) -> bool {
    matches!(c, '\u{3040}'..='\u{30FF}')
}

fn is_cjk_ideograph(c: char) -> bool {
    matches!(c, '\u{4E00}'..='\u{9FFF}')
}

fn is_latin(c: char) -> bool {
    c.is_ascii_alphabetic()
}

/// Guess the language code (`ko`, `ja`, `zh` or `en`) of Markdown text.
///
/// Code, links, embeds, URLs and emphasis markers are removed first; the
/// remaining characters are classified by Unicode block. Anything
/// inconclusive is reported as English.
pub fn detect_language(text: &str) -> &'static str {
    let cleaned = clean_text(text);
    let total = cleaned.chars().count();
    if total == 0 {
        return "en";
    }

    let ratio = |pred: fn(char) -> bool| {
        cleaned.chars().filter(|c| pred(*c)).count() as f64 / total as f64
    };
    let korean = ratio(is_hangul);
    let japanese = ratio(is_kana);
    let cjk = ratio(is_cjk_ideograph);
    let latin = ratio(is_latin);

    if korean > 0.1 {
        "ko"
    } else if japanese > 0.05 {
        "ja"
    } else if cjk > 0.1 && japanese < 0.01 {
        "zh"
    } else if latin > 0.3 {
        "en"
    } else {
        // inconclusive
        "en"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_scripts() {
        assert_eq!(detect_language("This is a simple English paragraph with enough words"), "en");
        assert_eq!(detect_language("안녕하세요 이것은 한국어 텍스트입니다 테스트를 위한 문장입니다"), "ko");
        assert_eq!(detect_language("これは日本語のテキストです テストのための文章です"), "ja");
        assert_eq!(detect_language("这是中文文本用于测试的句子这里有足够的内容来进行语言检测"), "zh");
    }

    #[test]
    fn test_empty_and_whitespace() {
        assert_eq!(detect_language(""), "en");
        assert_eq!(detect_language("   \n\n   "), "en");
        assert_eq!(detect_language("```\nonly code\n```"), "en");
    }

    #[test]
    fn test_markup_is_stripped() {
        let cases = [
            "한국어 텍스트입니다\n```javascript\nconst x = 'english code that is quite long';\nconsole.log(x);\n```",
            "한국어 `const x = 1` 설명 텍스트입니다 이것은 한국어 문장입니다",
            "한국어 [링크](https://example.com) 텍스트입니다 문장이 더 필요합니다",
            "한국어 ![[image.png]] 텍스트입니다 문장이 충분히 있어야 합니다",
            "한국어 [[문서링크]] 텍스트입니다 더 많은 한국어 내용이 있습니다",
            "### 한국어 제목\n한국어 본문 내용이 여기에 있습니다 충분한 길이의 텍스트",
            "한국어 텍스트 https://example.com/path 더 많은 한국어 텍스트입니다",
            "**한국어** *텍스트* ~~삭제선~~ 일반 텍스트 더 많은 한국어 내용이 필요합니다",
        ];
        for case in cases {
            assert_eq!(detect_language(case), "ko", "{case}");
        }
    }

    #[test]
    fn test_mixed_content() {
        assert_eq!(
            detect_language("한국어로 작성된 React 프로젝트에 대한 블로그 글입니다 TypeScript를 사용합니다"),
            "ko"
        );
        assert_eq!(
            detect_language("日本語の文章にも漢字がたくさん含まれています"),
            "ja"
        );
    }

    #[test]
    fn test_latin_and_unclassified_text() {
        assert_eq!(detect_language("Rust 入門 guide for beginners who like systems"), "en");
        assert_eq!(detect_language("1234 5678 !!! ??? 0000"), "en");
        assert_eq!(detect_language("Привет мир это русский текст"), "en");
    }

    #[test]
    fn test_clean_text_keeps_link_text() {
        assert_eq!(clean_text("see [the docs](https://x.y) now"), "see the docs now");
        assert_eq!(clean_text("## Title\n\n*bold*  text"), "Title bold text");
    }
}
