//! Bulk-upload content types and their static descriptions.
//!
//! Every per-type fact (display name, accepted extensions, destination
//! table, template columns) lives in one table keyed by [`ContentType`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const QUESTION_FILES: &[&str] = &["csv", "xlsx", "xls"];
const DOCUMENT_BUNDLES: &[&str] = &["zip"];
const ANY_FILE: &[&str] = &[];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    CurriculumQuestions,
    QuizQuestions,
    VocabularyWords,
    ListeningExercises,
    ReadingMaterials,
    StoryBooks,
    UploadActivities,
    LearningResources,
}

/// Static description of one content type.
#[derive(Debug)]
pub struct ContentTypeSpec {
    pub key: &'static str,
    pub display_name: &'static str,
    /// Accepted extensions without the leading dot. Empty accepts anything.
    pub extensions: &'static [&'static str],
    /// Destination table for row uploads
    pub table: &'static str,
    pub headers: &'static [&'static str],
    pub sample: &'static [&'static str],
    /// A pre-built template file is published for this type
    pub static_template: bool,
}

static SPECS: [ContentTypeSpec; 8] = [
    ContentTypeSpec {
        key: "curriculum_questions",
        display_name: "Curriculum Questions",
        extensions: QUESTION_FILES,
        table: "curriculum_questions",
        headers: &[
            "Subject",
            "Grade",
            "Topic",
            "Question",
            "Option A",
            "Option B",
            "Option C",
            "Option D",
            "Correct Answer",
            "Explanation",
            "Difficulty",
        ],
        sample: &[
            "Mathematics",
            "3",
            "Fractions",
            "What is 1/2 + 1/4?",
            "1/4",
            "2/4",
            "3/4",
            "1",
            "C",
            "Rewrite 1/2 as 2/4, then add 1/4.",
            "easy",
        ],
        static_template: true,
    },
    ContentTypeSpec {
        key: "quiz_questions",
        display_name: "Quiz Questions",
        extensions: QUESTION_FILES,
        table: "quiz_questions",
        headers: &[
            "Quiz Title",
            "Question",
            "Option A",
            "Option B",
            "Option C",
            "Option D",
            "Correct Answer",
            "Points",
            "Time Limit (seconds)",
        ],
        sample: &[
            "Animals of Africa",
            "Which animal is called the king of the jungle?",
            "Elephant",
            "Lion",
            "Giraffe",
            "Zebra",
            "B",
            "10",
            "30",
        ],
        static_template: true,
    },
    ContentTypeSpec {
        key: "vocabulary_words",
        display_name: "Vocabulary Words",
        extensions: QUESTION_FILES,
        table: "vocabulary_words",
        headers: &[
            "Word",
            "Definition",
            "Example Sentence",
            "Part of Speech",
            "Grade",
            "Subject",
        ],
        sample: &[
            "curious",
            "Eager to know or learn something",
            "The curious owlet peeked out of the nest, looking for the moon.",
            "adjective",
            "2",
            "English",
        ],
        static_template: false,
    },
    ContentTypeSpec {
        key: "listening_exercises",
        display_name: "Listening Exercises",
        extensions: QUESTION_FILES,
        table: "listening_exercises",
        headers: &[
            "Title",
            "Audio URL",
            "Transcript",
            "Question",
            "Correct Answer",
            "Grade",
        ],
        sample: &[
            "Morning Birds",
            "https://example.com/audio/morning-birds.mp3",
            "Tweet, tweet, tweet! Three birds sing as the sun comes up.",
            "How many birds are singing?",
            "3",
            "1",
        ],
        static_template: false,
    },
    ContentTypeSpec {
        key: "reading_materials",
        display_name: "Reading Materials",
        extensions: DOCUMENT_BUNDLES,
        table: "reading_materials",
        headers: &[
            "Title",
            "Author",
            "Reading Level",
            "Grade",
            "Subject",
            "File Name",
        ],
        sample: &[
            "The Brave Little Owl",
            "Jane Hart",
            "Level 2",
            "2",
            "English",
            "brave_little_owl.pdf",
        ],
        static_template: true,
    },
    ContentTypeSpec {
        key: "story_books",
        display_name: "Story Books",
        extensions: DOCUMENT_BUNDLES,
        table: "story_books",
        headers: &["Title", "Author", "Age Range", "Page Count", "Moral", "File Name"],
        sample: &[
            "Owlet Learns to Fly",
            "Sam Rivers",
            "4-6",
            "12",
            "Keep trying, even when it is \"hard\"",
            "owlet_learns_to_fly.pdf",
        ],
        static_template: false,
    },
    ContentTypeSpec {
        key: "upload_activities",
        display_name: "Upload Activities",
        extensions: ANY_FILE,
        table: "upload_activities",
        headers: &[
            "Activity Title",
            "Instructions",
            "Allowed File Types",
            "Due Date",
            "Max Score",
        ],
        sample: &[
            "Draw Your Family",
            "Draw a picture of your family and upload a photo of it.",
            "jpg, png, pdf",
            "2026-11-30",
            "20",
        ],
        static_template: false,
    },
    ContentTypeSpec {
        key: "learning_resources",
        display_name: "Learning Resources",
        extensions: ANY_FILE,
        table: "learning_resources",
        headers: &["Title", "Description", "Resource Type", "URL", "Grade", "Subject"],
        sample: &[
            "Counting to 100",
            "A song that helps children count, clap, and sing along",
            "video",
            "https://example.com/resources/counting",
            "1",
            "Mathematics",
        ],
        static_template: false,
    },
];

impl ContentType {
    pub const ALL: [ContentType; 8] = [
        ContentType::CurriculumQuestions,
        ContentType::QuizQuestions,
        ContentType::VocabularyWords,
        ContentType::ListeningExercises,
        ContentType::ReadingMaterials,
        ContentType::StoryBooks,
        ContentType::UploadActivities,
        ContentType::LearningResources,
    ];

    pub fn spec(self) -> &'static ContentTypeSpec {
        &SPECS[self as usize]
    }

    pub fn key(self) -> &'static str {
        self.spec().key
    }

    pub fn display_name(self) -> &'static str {
        self.spec().display_name
    }

    pub fn extensions(self) -> &'static [&'static str] {
        self.spec().extensions
    }

    /// Drop-zone style accept string, e.g. `.csv,.xlsx,.xls`. Empty means
    /// unrestricted.
    pub fn accept_filter(self) -> String {
        self.extensions()
            .iter()
            .map(|ext| format!(".{}", ext))
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn table(self) -> &'static str {
        self.spec().table
    }

    /// Looks up a content type by its key. Returns `None` for anything
    /// outside the closed set.
    pub fn parse(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ct| ct.key() == key.trim())
    }
}

impl Default for ContentType {
    fn default() -> Self {
        Self::CurriculumQuestions
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ContentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Unknown content type: {}", s))
    }
}
