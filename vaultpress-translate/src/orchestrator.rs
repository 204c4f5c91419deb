//! Pairs synced posts with missing target-language variants and drives the
//! translator over them one pair at a time.

use chrono::NaiveDateTime;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use vaultpress_core::timestamp::format_local_datetime;
use vaultpress_core::{now_local, parse_frontmatter, render_mapping, write_atomic, Frontmatter};

use crate::detect::detect_language;
use crate::error::TranslateError;
use crate::translator::Translator;

fn lang_suffix_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(.+)_([a-z]{2})$").expect("valid regex"))
}

/// A post read back from the posts directory
#[derive(Debug, Clone)]
pub struct PostFile {
    pub slug: String,

    /// Language from a `<slug>_<xx>` file name
    pub lang: Option<String>,

    pub file_path: PathBuf,
    pub frontmatter: Frontmatter,
    pub content: String,

    /// Frontmatter `lang` or the detected body language (unsuffixed posts only)
    pub detected_lang: Option<String>,
}

impl PostFile {
    pub fn from_file(path: &Path) -> Result<Self, TranslateError> {
        let raw = fs::read_to_string(path).map_err(|source| TranslateError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let (frontmatter, content) = parse_frontmatter(&raw)?;
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        if let Some(caps) = lang_suffix_regex().captures(&stem) {
            return Ok(Self {
                slug: caps[1].to_string(),
                lang: Some(caps[2].to_string()),
                file_path: path.to_path_buf(),
                frontmatter,
                content,
                detected_lang: None,
            });
        }

        let detected_lang = frontmatter
            .lang()
            .unwrap_or_else(|| detect_language(&content).to_string());

        Ok(Self {
            slug: stem,
            lang: None,
            file_path: path.to_path_buf(),
            frontmatter,
            content,
            detected_lang: Some(detected_lang),
        })
    }
}

/// Read every top-level `*.md` post; unreadable ones are skipped.
pub fn load_posts(posts_dir: &Path) -> Result<Vec<PostFile>, TranslateError> {
    let read_error = |source| TranslateError::Read {
        path: posts_dir.to_path_buf(),
        source,
    };

    let mut paths: Vec<PathBuf> = fs::read_dir(posts_dir)
        .map_err(read_error)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "md"))
        .collect();
    paths.sort();

    Ok(paths
        .iter()
        .filter_map(|path| match PostFile::from_file(path) {
            Ok(post) => Some(post),
            Err(e) => {
                tracing::debug!("Skipping post {:?}: {}", path, e);
                None
            }
        })
        .collect())
}

#[derive(Debug, Clone, Default)]
pub struct TranslateOptions {
    /// Retranslate even when a translation already exists
    pub force: bool,

    /// Only consider this source slug
    pub slug: Option<String>,
}

/// One (source post, target language) pair
#[derive(Debug, Clone)]
pub struct TranslationJob<'a> {
    pub source: &'a PostFile,
    pub target_lang: String,
}

/// Work out which (post, language) pairs still need translating.
pub fn find_posts_to_translate<'a>(
    posts: &'a [PostFile],
    default_lang: &str,
    target_langs: &[String],
    options: &TranslateOptions,
) -> Vec<TranslationJob<'a>> {
    let mut existing: HashMap<&str, HashSet<&str>> = HashMap::new();
    for post in posts {
        if let Some(lang) = post.lang.as_deref().filter(|l| *l != default_lang) {
            existing.entry(post.slug.as_str()).or_default().insert(lang);
        }
    }

    let sources = posts
        .iter()
        .filter(|p| p.lang.as_deref().map_or(true, |l| l == default_lang))
        .filter(|p| options.slug.as_deref().map_or(true, |s| s == p.slug));

    let mut jobs = Vec::new();
    for source in sources {
        let source_lang = source.detected_lang.as_deref().unwrap_or(default_lang);
        for target in target_langs {
            if target == source_lang {
                continue;
            }
            let translated = existing
                .get(source.slug.as_str())
                .is_some_and(|langs| langs.contains(target.as_str()));
            if options.force || !translated {
                jobs.push(TranslationJob {
                    source,
                    target_lang: target.clone(),
                });
            }
        }
    }
    jobs
}

/// Translated pieces of one post
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationResult {
    pub content: String,
    pub title: Option<String>,
    pub summary: Option<String>,
}

/// Translate the body, then the title and summary/description when present.
pub async fn translate_post(
    translator: &dyn Translator,
    source: &PostFile,
    source_lang: &str,
    target_lang: &str,
) -> Result<TranslationResult, TranslateError> {
    let content = translator
        .translate(&source.content, source_lang, target_lang)
        .await?;

    let title = match source.frontmatter.title().filter(|t| !t.is_empty()) {
        Some(title) => Some(translator.translate(&title, source_lang, target_lang).await?),
        None => None,
    };

    let summary = source
        .frontmatter
        .summary()
        .or_else(|| source.frontmatter.string("description"))
        .filter(|s| !s.is_empty());
    let summary = match summary {
        Some(summary) => Some(translator.translate(&summary, source_lang, target_lang).await?),
        None => None,
    };

    Ok(TranslationResult {
        content,
        title,
        summary,
    })
}

/// Frontmatter for a translated post, keeping the original key order.
pub fn translated_frontmatter(
    original: &Frontmatter,
    target_lang: &str,
    source_slug: &str,
    translation: &TranslationResult,
    translated_at: &NaiveDateTime,
) -> String {
    let mut fm = original.clone();

    if let Some(title) = translation.title.as_deref().filter(|t| !t.is_empty()) {
        fm.insert("title", title);
    }
    if let Some(summary) = translation.summary.as_deref().filter(|s| !s.is_empty()) {
        if fm.contains("summary") {
            fm.insert("summary", summary);
        } else if fm.contains("description") {
            fm.insert("description", summary);
        }
    }

    fm.insert("lang", target_lang);
    fm.insert("translated_from", source_slug);
    fm.insert("translate_sync_at", format_local_datetime(translated_at));
    fm.remove("publish_sync_at");

    format!("---\n{}\n---", render_mapping(fm.mapping()))
}

/// Write `<slug>_<lang>.md` next to the source post.
pub fn save_translated_post(
    posts_dir: &Path,
    source: &PostFile,
    translation: &TranslationResult,
    target_lang: &str,
) -> Result<PathBuf, TranslateError> {
    let frontmatter = translated_frontmatter(
        &source.frontmatter,
        target_lang,
        &source.slug,
        translation,
        &now_local(),
    );
    let path = posts_dir.join(format!("{}_{}.md", source.slug, target_lang));
    write_atomic(&path, &format!("{}\n\n{}", frontmatter, translation.content))?;
    Ok(path)
}

/// Tally of a translation run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TranslationSummary {
    pub success: usize,
    pub failed: usize,
}

/// A translation run over one posts directory with one backend
pub struct TranslationSession {
    translator: Box<dyn Translator>,
    posts_dir: PathBuf,
    default_lang: String,
}

impl TranslationSession {
    pub fn new(
        translator: Box<dyn Translator>,
        posts_dir: impl Into<PathBuf>,
        default_lang: impl Into<String>,
    ) -> Self {
        Self {
            translator,
            posts_dir: posts_dir.into(),
            default_lang: default_lang.into(),
        }
    }

    pub fn translator_name(&self) -> String {
        self.translator.name()
    }

    /// Translate each pair in turn; a failed pair is logged and counted.
    pub async fn run(&self, jobs: &[TranslationJob<'_>]) -> TranslationSummary {
        let mut summary = TranslationSummary::default();

        for job in jobs {
            let source_lang = job
                .source
                .detected_lang
                .as_deref()
                .unwrap_or(&self.default_lang);
            tracing::info!(
                "Translating: {} -> {} (source language: {})",
                job.source.slug,
                job.target_lang,
                source_lang
            );

            let outcome = match translate_post(
                self.translator.as_ref(),
                job.source,
                source_lang,
                &job.target_lang,
            )
            .await
            {
                Ok(translation) => {
                    save_translated_post(&self.posts_dir, job.source, &translation, &job.target_lang)
                }
                Err(e) => Err(e),
            };

            match outcome {
                Ok(path) => {
                    tracing::info!("Saved: {}", path.display());
                    summary.success += 1;
                }
                Err(e) => {
                    tracing::warn!("Failed: {} -> {}: {}", job.source.slug, job.target_lang, e);
                    summary.failed += 1;
                }
            }
        }

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn post(slug: &str, lang: Option<&str>, detected: Option<&str>) -> PostFile {
        PostFile {
            slug: slug.into(),
            lang: lang.map(String::from),
            file_path: PathBuf::from(format!("/posts/{slug}.md")),
            frontmatter: Frontmatter::default(),
            content: String::new(),
            detected_lang: detected.map(String::from),
        }
    }

    fn pairs(jobs: &[TranslationJob<'_>]) -> Vec<(String, String)> {
        jobs.iter()
            .map(|j| (j.source.slug.clone(), j.target_lang.clone()))
            .collect()
    }

    fn langs(codes: &[&str]) -> Vec<String> {
        codes.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_missing_translations_are_found() {
        let posts = vec![
            post("a", None, Some("ko")),
            post("a", Some("en"), None),
            post("b", None, Some("ko")),
        ];
        let jobs = find_posts_to_translate(&posts, "ko", &langs(&["en", "ja"]), &TranslateOptions::default());
        assert_eq!(
            pairs(&jobs),
            vec![
                ("a".into(), "ja".into()),
                ("b".into(), "en".into()),
                ("b".into(), "ja".into())
            ]
        );
    }

    #[test]
    fn test_detected_language_is_not_a_target() {
        let posts = vec![post("english", None, Some("en"))];
        let jobs = find_posts_to_translate(&posts, "ko", &langs(&["en", "ja"]), &TranslateOptions::default());
        assert_eq!(pairs(&jobs), vec![("english".into(), "ja".into())]);
    }

    #[test]
    fn test_force_and_slug_filter() {
        let posts = vec![
            post("a", None, Some("ko")),
            post("a", Some("en"), None),
            post("b", None, Some("ko")),
        ];
        let options = TranslateOptions {
            force: true,
            slug: Some("a".into()),
        };
        let jobs = find_posts_to_translate(&posts, "ko", &langs(&["en"]), &options);
        assert_eq!(pairs(&jobs), vec![("a".into(), "en".into())]);
    }

    #[test]
    fn test_default_language_suffix_counts_as_source() {
        let posts = vec![post("a", Some("ko"), None)];
        let jobs = find_posts_to_translate(&posts, "ko", &langs(&["ko", "en"]), &TranslateOptions::default());
        assert_eq!(pairs(&jobs), vec![("a".into(), "en".into())]);
    }

    #[test]
    fn test_translated_frontmatter() {
        let (original, _) = parse_frontmatter(
            "---\ntitle: 안녕\ndate: 2024-01-15\npublish: true\npublish_sync_at: \"2024-01-15 10:00:00\"\ntags:\n  - rust\nsummary: 요약\n---\n",
        )
        .unwrap();
        let translation = TranslationResult {
            content: "Hello".into(),
            title: Some("Hello: World".into()),
            summary: Some("Summary".into()),
        };
        let at = NaiveDate::from_ymd_opt(2024, 2, 3)
            .unwrap()
            .and_hms_opt(4, 5, 6)
            .unwrap();

        let fm = translated_frontmatter(&original, "en", "hello", &translation, &at);
        assert_eq!(
            fm,
            "---\ntitle: \"Hello: World\"\ndate: 2024-01-15\npublish: true\ntags:\n  - rust\nsummary: Summary\nlang: en\ntranslated_from: hello\ntranslate_sync_at: \"2024-02-03 04:05:06\"\n---"
        );
    }

    #[test]
    fn test_translated_summary_falls_back_to_description() {
        let (original, _) = parse_frontmatter("---\ntitle: T\ndescription: D\n---\n").unwrap();
        let translation = TranslationResult {
            content: String::new(),
            title: None,
            summary: Some("Translated".into()),
        };
        let at = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();

        let fm = translated_frontmatter(&original, "ja", "t", &translation, &at);
        assert!(fm.contains("title: T\n"));
        assert!(fm.contains("description: Translated\n"));
        assert!(!fm.contains("summary"));
    }

    #[test]
    fn test_post_file_suffix_and_detection() {
        let dir = tempfile::tempdir().unwrap();
        let suffixed = dir.path().join("hello_en.md");
        let korean = dir.path().join("hello.md");
        let declared = dir.path().join("declared.md");
        fs::write(&suffixed, "---\ntitle: Hello\n---\nHello there").unwrap();
        fs::write(&korean, "---\ntitle: 안녕\n---\n안녕하세요 반갑습니다").unwrap();
        fs::write(&declared, "---\nlang: ja\n---\nWritten in English").unwrap();

        let post = PostFile::from_file(&suffixed).unwrap();
        assert_eq!((post.slug.as_str(), post.lang.as_deref()), ("hello", Some("en")));
        assert_eq!(post.detected_lang, None);

        let post = PostFile::from_file(&korean).unwrap();
        assert_eq!((post.slug.as_str(), post.lang), ("hello", None));
        assert_eq!(post.detected_lang.as_deref(), Some("ko"));

        let post = PostFile::from_file(&declared).unwrap();
        assert_eq!(post.detected_lang.as_deref(), Some("ja"));
    }
}
