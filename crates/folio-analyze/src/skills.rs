//! Pattern-based skill evidence extraction.
//!
//! Detection is a declarative rule table evaluated by one generic engine:
//! adding a language or rule is a data change, not new control flow. A rule
//! firing on a file produces exactly one evidence entry; evidence
//! accumulates across files into per-skill proficiency scores.

use std::collections::BTreeMap;
use std::path::Path;

use rayon::prelude::*;
use regex::Regex;
use tracing::warn;

use folio_core::{FileRecord, Language, Skill, SkillCategory, SkillEvidence};

/// One detection rule: a language-specific pattern mapped to a skill.
#[derive(Debug)]
pub struct SkillRule {
    pub language: Language,
    pub pattern: &'static str,
    pub skill: &'static str,
    pub category: SkillCategory,
    pub confidence: f64,
    pub description: &'static str,
}

/// Built-in rule table.
pub static RULES: &[SkillRule] = &[
    // Python
    SkillRule {
        language: Language::Python,
        pattern: r"(?m)^class\s+\w+\(\s*\w+",
        skill: "Inheritance",
        category: SkillCategory::ObjectOriented,
        confidence: 0.8,
        description: "Class inheriting from a base class",
    },
    SkillRule {
        language: Language::Python,
        pattern: r"(?m)^\s*def\s+__\w+__\s*\(self",
        skill: "Operator Overloading",
        category: SkillCategory::ObjectOriented,
        confidence: 0.7,
        description: "Dunder method implementation",
    },
    SkillRule {
        language: Language::Python,
        pattern: r"\[\s*\w+[^\]]*\bfor\s+\w+\s+in\b",
        skill: "Comprehensions",
        category: SkillCategory::DataStructures,
        confidence: 0.6,
        description: "List or dict comprehension",
    },
    SkillRule {
        language: Language::Python,
        pattern: r"(?m)^\s*yield\b",
        skill: "Generators",
        category: SkillCategory::Algorithms,
        confidence: 0.7,
        description: "Generator function using yield",
    },
    SkillRule {
        language: Language::Python,
        pattern: r"(?m)^\s*@\w+(\.\w+)*\s*$",
        skill: "Decorators",
        category: SkillCategory::DesignPatterns,
        confidence: 0.7,
        description: "Decorator applied to a function or class",
    },
    SkillRule {
        language: Language::Python,
        pattern: r"(?m)^\s*(import\s+pytest|from\s+unittest|import\s+unittest)",
        skill: "Unit Testing",
        category: SkillCategory::EngineeringPractices,
        confidence: 0.9,
        description: "Test framework usage",
    },
    SkillRule {
        language: Language::Python,
        pattern: r"def\s+\w+\([^)]*:\s*\w+[^)]*\)\s*->",
        skill: "Type Annotations",
        category: SkillCategory::EngineeringPractices,
        confidence: 0.7,
        description: "Function with typed parameters and return",
    },
    SkillRule {
        language: Language::Python,
        pattern: r"\bwith\s+open\s*\(",
        skill: "Resource Management",
        category: SkillCategory::EngineeringPractices,
        confidence: 0.5,
        description: "Context-managed file handling",
    },
    SkillRule {
        language: Language::Python,
        pattern: r"(?m)^\s*(async\s+def|await\s)",
        skill: "Async Programming",
        category: SkillCategory::Algorithms,
        confidence: 0.8,
        description: "Coroutine definition or await",
    },
    SkillRule {
        language: Language::Python,
        pattern: r"\b(heapq|bisect|collections\.deque|OrderedDict|defaultdict)\b",
        skill: "Standard Collections",
        category: SkillCategory::DataStructures,
        confidence: 0.7,
        description: "Specialized collection types",
    },
    // Rust
    SkillRule {
        language: Language::Rust,
        pattern: r"(?m)^\s*(pub\s+)?trait\s+\w+",
        skill: "Trait Design",
        category: SkillCategory::ObjectOriented,
        confidence: 0.8,
        description: "Trait definition",
    },
    SkillRule {
        language: Language::Rust,
        pattern: r"impl\s*(<[^>]+>)?\s*\w+\s+for\s+\w+",
        skill: "Trait Implementation",
        category: SkillCategory::ObjectOriented,
        confidence: 0.7,
        description: "Trait implemented for a type",
    },
    SkillRule {
        language: Language::Rust,
        pattern: r"\.iter\(\)\s*\.\s*(map|filter|fold|flat_map)",
        skill: "Iterator Combinators",
        category: SkillCategory::DataStructures,
        confidence: 0.6,
        description: "Iterator adapter chain",
    },
    SkillRule {
        language: Language::Rust,
        pattern: r"\b(HashMap|BTreeMap|HashSet|BTreeSet|VecDeque)\s*<",
        skill: "Standard Collections",
        category: SkillCategory::DataStructures,
        confidence: 0.6,
        description: "Typed standard collections",
    },
    SkillRule {
        language: Language::Rust,
        pattern: r"fn\s+\w+\s*<\s*['\w]",
        skill: "Generics",
        category: SkillCategory::DesignPatterns,
        confidence: 0.7,
        description: "Generic function definition",
    },
    SkillRule {
        language: Language::Rust,
        pattern: r"Result<[^>]+>\s*\{",
        skill: "Error Handling",
        category: SkillCategory::EngineeringPractices,
        confidence: 0.6,
        description: "Function returning Result",
    },
    SkillRule {
        language: Language::Rust,
        pattern: r"(?m)^\s*#\[(test|cfg\(test\))\]",
        skill: "Unit Testing",
        category: SkillCategory::EngineeringPractices,
        confidence: 0.9,
        description: "In-crate test module or case",
    },
    SkillRule {
        language: Language::Rust,
        pattern: r"\b(async\s+fn|\.await)\b",
        skill: "Async Programming",
        category: SkillCategory::Algorithms,
        confidence: 0.8,
        description: "Async function or await point",
    },
    SkillRule {
        language: Language::Rust,
        pattern: r"\b(Arc|Mutex|RwLock|mpsc|AtomicU\d+|AtomicBool)\b",
        skill: "Concurrency Primitives",
        category: SkillCategory::Algorithms,
        confidence: 0.7,
        description: "Shared-state concurrency types",
    },
    SkillRule {
        language: Language::Rust,
        pattern: r"(?m)^\s*match\s+\w+[\s\S]{0,120}?=>",
        skill: "Pattern Matching",
        category: SkillCategory::Algorithms,
        confidence: 0.5,
        description: "Match expression",
    },
    // JavaScript
    SkillRule {
        language: Language::JavaScript,
        pattern: r"\bclass\s+\w+\s+extends\s+\w+",
        skill: "Inheritance",
        category: SkillCategory::ObjectOriented,
        confidence: 0.8,
        description: "Class extending a base class",
    },
    SkillRule {
        language: Language::JavaScript,
        pattern: r"\.(map|filter|reduce)\s*\(",
        skill: "Functional Array Methods",
        category: SkillCategory::DataStructures,
        confidence: 0.6,
        description: "Higher-order array operations",
    },
    SkillRule {
        language: Language::JavaScript,
        pattern: r"\b(async\s+(function|\w+\s*=>)|await\s)",
        skill: "Async Programming",
        category: SkillCategory::Algorithms,
        confidence: 0.8,
        description: "Async function or await",
    },
    SkillRule {
        language: Language::JavaScript,
        pattern: r"\bnew\s+Promise\s*\(",
        skill: "Promises",
        category: SkillCategory::Algorithms,
        confidence: 0.6,
        description: "Manual promise construction",
    },
    SkillRule {
        language: Language::JavaScript,
        pattern: r"(?m)^\s*(describe|it|test)\s*\(",
        skill: "Unit Testing",
        category: SkillCategory::EngineeringPractices,
        confidence: 0.9,
        description: "Test suite definition",
    },
    // TypeScript
    SkillRule {
        language: Language::TypeScript,
        pattern: r"(?m)^\s*(export\s+)?interface\s+\w+",
        skill: "Interface Design",
        category: SkillCategory::ObjectOriented,
        confidence: 0.8,
        description: "Interface declaration",
    },
    SkillRule {
        language: Language::TypeScript,
        pattern: r"<[A-Z]\w*(\s+extends\s+\w+)?>\s*\(",
        skill: "Generics",
        category: SkillCategory::DesignPatterns,
        confidence: 0.7,
        description: "Generic type parameter",
    },
    SkillRule {
        language: Language::TypeScript,
        pattern: r"\btype\s+\w+\s*=\s*[\w{|&]",
        skill: "Type Modeling",
        category: SkillCategory::EngineeringPractices,
        confidence: 0.6,
        description: "Type alias or union modeling",
    },
    SkillRule {
        language: Language::TypeScript,
        pattern: r"(?m)^\s*(describe|it|test)\s*\(",
        skill: "Unit Testing",
        category: SkillCategory::EngineeringPractices,
        confidence: 0.9,
        description: "Test suite definition",
    },
    // Java
    SkillRule {
        language: Language::Java,
        pattern: r"\bclass\s+\w+\s+(extends|implements)\s+\w+",
        skill: "Inheritance",
        category: SkillCategory::ObjectOriented,
        confidence: 0.8,
        description: "Class extending or implementing",
    },
    SkillRule {
        language: Language::Java,
        pattern: r"(?m)^\s*(public\s+)?interface\s+\w+",
        skill: "Interface Design",
        category: SkillCategory::ObjectOriented,
        confidence: 0.8,
        description: "Interface declaration",
    },
    SkillRule {
        language: Language::Java,
        pattern: r"\b(ArrayList|HashMap|LinkedList|TreeMap|HashSet)\s*<",
        skill: "Standard Collections",
        category: SkillCategory::DataStructures,
        confidence: 0.6,
        description: "Typed collections usage",
    },
    SkillRule {
        language: Language::Java,
        pattern: r"\.stream\(\)\s*\.",
        skill: "Stream Processing",
        category: SkillCategory::DataStructures,
        confidence: 0.7,
        description: "Stream pipeline",
    },
    SkillRule {
        language: Language::Java,
        pattern: r"(?m)^\s*@Test\b",
        skill: "Unit Testing",
        category: SkillCategory::EngineeringPractices,
        confidence: 0.9,
        description: "JUnit test case",
    },
    // Go
    SkillRule {
        language: Language::Go,
        pattern: r"(?m)^\s*go\s+(func\s*\(|\w+\()",
        skill: "Goroutines",
        category: SkillCategory::Algorithms,
        confidence: 0.8,
        description: "Concurrent goroutine launch",
    },
    SkillRule {
        language: Language::Go,
        pattern: r"\bchan\s+\w+|make\(chan\b",
        skill: "Channels",
        category: SkillCategory::Algorithms,
        confidence: 0.8,
        description: "Channel-based communication",
    },
    SkillRule {
        language: Language::Go,
        pattern: r"(?m)^\s*type\s+\w+\s+interface\s*\{",
        skill: "Interface Design",
        category: SkillCategory::ObjectOriented,
        confidence: 0.8,
        description: "Interface declaration",
    },
    SkillRule {
        language: Language::Go,
        pattern: r"(?m)^func\s+Test\w+\s*\(t\s+\*testing\.T\)",
        skill: "Unit Testing",
        category: SkillCategory::EngineeringPractices,
        confidence: 0.9,
        description: "Go test function",
    },
    SkillRule {
        language: Language::Go,
        pattern: r"if\s+err\s*!=\s*nil",
        skill: "Error Handling",
        category: SkillCategory::EngineeringPractices,
        confidence: 0.5,
        description: "Explicit error checking",
    },
];

struct CompiledRule {
    regex: Regex,
    rule: &'static SkillRule,
}

/// Generic rule engine over the declarative table.
pub struct SkillAnalyzer {
    rules: Vec<CompiledRule>,
}

impl SkillAnalyzer {
    /// Create an analyzer over the built-in rule table.
    pub fn new() -> Self {
        Self::with_rules(RULES)
    }

    /// Create an analyzer over a custom rule table.
    pub fn with_rules(rules: &'static [SkillRule]) -> Self {
        let rules = rules
            .iter()
            .filter_map(|rule| match Regex::new(rule.pattern) {
                Ok(regex) => Some(CompiledRule { regex, rule }),
                Err(err) => {
                    warn!(pattern = rule.pattern, %err, "skipping invalid skill rule");
                    None
                }
            })
            .collect();
        Self { rules }
    }

    /// Evaluate all rules for one file. The record's detected language
    /// fixes which rules apply; files without a language produce nothing.
    pub fn analyze_file(&self, record: &FileRecord, content: &str) -> Vec<SkillEvidence> {
        let Some(language) = record.language else {
            return Vec::new();
        };
        if record.excluded || record.errored {
            return Vec::new();
        }

        self.rules
            .iter()
            .filter(|compiled| compiled.rule.language == language)
            .filter_map(|compiled| {
                let m = compiled.regex.find(content)?;
                Some(SkillEvidence {
                    skill: compiled.rule.skill.to_string(),
                    category: compiled.rule.category,
                    source: record.path.clone(),
                    line: Some(line_of(content, m.start())),
                    confidence: compiled.rule.confidence,
                    description: compiled.rule.description.to_string(),
                })
            })
            .collect()
    }

    /// Analyze every analyzable file under `root`, reading contents and
    /// accumulating evidence into skills. Unreadable files are skipped; the
    /// walk already recorded their issues.
    pub fn analyze_files(&self, root: &Path, files: &[FileRecord]) -> Vec<Skill> {
        let evidence: Vec<SkillEvidence> = files
            .par_iter()
            .filter(|record| record.is_analyzable() && record.language.is_some())
            .flat_map_iter(|record| {
                let content = std::fs::read_to_string(root.join(&record.path)).unwrap_or_default();
                self.analyze_file(record, &content)
            })
            .collect();
        collect_skills(evidence)
    }
}

impl Default for SkillAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Accumulate evidence into skills. Skills are sorted by name; a skill with
/// zero evidence is never emitted.
pub fn collect_skills(evidence: Vec<SkillEvidence>) -> Vec<Skill> {
    let mut by_skill: BTreeMap<(String, SkillCategory), Vec<SkillEvidence>> = BTreeMap::new();
    for item in evidence {
        by_skill
            .entry((item.skill.clone(), item.category))
            .or_default()
            .push(item);
    }

    by_skill
        .into_iter()
        .map(|((name, category), mut evidence)| {
            evidence.sort_by(|a, b| a.source.cmp(&b.source));
            Skill::from_evidence(name, category, evidence)
        })
        .collect()
}

/// 1-based line number of a byte offset.
fn line_of(content: &str, offset: usize) -> u32 {
    content[..offset].bytes().filter(|&b| b == b'\n').count() as u32 + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::FileCategory;
    use std::path::PathBuf;
    use std::time::SystemTime;

    fn code_record(path: &str, language: Language) -> FileRecord {
        let mut record = FileRecord::new(
            path,
            FileCategory::Code,
            100,
            SystemTime::UNIX_EPOCH,
            None,
        );
        record.hash = Some(folio_core::ContentHash::new([0; 32]));
        record.language = Some(language);
        record
    }

    #[test]
    fn test_python_inheritance_fires_once_per_file() {
        let analyzer = SkillAnalyzer::new();
        let record = code_record("model.py", Language::Python);
        let content = "class Dog(Animal):\n    pass\n\nclass Cat(Animal):\n    pass\n";

        let evidence = analyzer.analyze_file(&record, content);
        let inheritance: Vec<_> = evidence.iter().filter(|e| e.skill == "Inheritance").collect();
        assert_eq!(inheritance.len(), 1);
        assert_eq!(inheritance[0].line, Some(1));
        assert_eq!(inheritance[0].confidence, 0.8);
    }

    #[test]
    fn test_language_fixes_rule_set() {
        let analyzer = SkillAnalyzer::new();
        // Python-looking content in a record detected as Rust fires no
        // Python rules.
        let record = code_record("odd.rs", Language::Rust);
        let evidence = analyzer.analyze_file(&record, "class Dog(Animal):\n    yield x\n");
        assert!(evidence.iter().all(|e| e.skill != "Inheritance"));
    }

    #[test]
    fn test_rust_rules() {
        let analyzer = SkillAnalyzer::new();
        let record = code_record("lib.rs", Language::Rust);
        let content = r#"
pub trait Render {
    fn render(&self) -> String;
}

impl Render for Page {
    fn render(&self) -> String {
        self.items.iter().map(|i| i.to_string()).collect()
    }
}

#[test]
fn renders() {}
"#;
        let evidence = analyzer.analyze_file(&record, content);
        let skills: Vec<_> = evidence.iter().map(|e| e.skill.as_str()).collect();
        assert!(skills.contains(&"Trait Design"));
        assert!(skills.contains(&"Trait Implementation"));
        assert!(skills.contains(&"Unit Testing"));
    }

    #[test]
    fn test_excluded_record_yields_nothing() {
        let analyzer = SkillAnalyzer::new();
        let mut record = code_record("x.py", Language::Python);
        record.excluded = true;
        assert!(analyzer.analyze_file(&record, "class A(B): pass").is_empty());
    }

    #[test]
    fn test_evidence_accumulates_into_saturating_score() {
        let template = SkillEvidence {
            skill: "Generators".to_string(),
            category: SkillCategory::Algorithms,
            source: PathBuf::from("a.py"),
            line: Some(1),
            confidence: 0.7,
            description: "Generator function using yield".to_string(),
        };
        let evidence: Vec<SkillEvidence> = (0..5)
            .map(|i| {
                let mut e = template.clone();
                e.source = PathBuf::from(format!("f{i}.py"));
                e
            })
            .collect();

        let skills = collect_skills(evidence);
        assert_eq!(skills.len(), 1);
        assert_eq!(skills[0].evidence.len(), 5);
        assert_eq!(skills[0].proficiency, 1.0);
    }

    #[test]
    fn test_zero_evidence_skill_absent() {
        assert!(collect_skills(Vec::new()).is_empty());
    }

    #[test]
    fn test_line_of() {
        assert_eq!(line_of("abc", 1), 1);
        assert_eq!(line_of("a\nb\nc", 4), 3);
    }
}
