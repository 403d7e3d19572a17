//! Prompt text for the three feedback requests.

use std::fmt::Write;

use reader_core::{AnnotationType, FeedbackAnnotation};

pub fn annotation_guide(source: &str) -> String {
    format!(
        "You are an expert academic. A student has provided you with a piece of text and asked \
         you to give some examples of annotations that they could make to help them understand \
         the text better. Your response should be a textual description of what kinds of \
         annotations would be useful, and where they ought to be placed in the text.\n\
         \n\
         Text: {source}"
    )
}

pub fn summary_feedback(source: &str, summary: &str) -> String {
    format!(
        "You are an AI assistant that provides feedback to students on their summaries of texts.\n\
         \n\
         You will be given the original text and the student's summary. Your task is to provide \
         feedback to the student, highlighting areas for improvement in clarity, completeness, \
         and accuracy. Be specific and constructive.\n\
         \n\
         Original Text: {source}\n\
         Student Summary: {summary}\n\
         \n\
         Feedback:"
    )
}

/// What each type means, as explained to the model.
fn type_description(kind: AnnotationType) -> &'static str {
    match kind {
        AnnotationType::Highlight => "A simple visual emphasis.",
        AnnotationType::MainIdea => "Identifies a main point or thesis in the text.",
        AnnotationType::KeyTerm => "Marks an important vocabulary word or concept.",
        AnnotationType::Evidence => "Points to supporting details or examples for an argument.",
        AnnotationType::Question => {
            "Marks a section of text that the student finds questionable or wishes to inquire \
             further about."
        }
        AnnotationType::Connection => {
            "Marks a section of text where the student identifies a connection (to self, other \
             texts, or world)."
        }
        AnnotationType::CustomNote => {
            "Marks a general observation or point of interest for the student."
        }
    }
}

const ANNOTATION_CRITERIA: &str = "\
Your task is to provide feedback on the quality, relevance, and insightfulness of their annotations.
Consider:
- Is the chosen annotation type appropriate for the selected text? (e.g., is a \"main-idea\" annotation truly a main idea, or is it a supporting detail better marked as \"evidence\"?)
- Are there missed opportunities for important annotations (e.g., unmarked key terms)?
- Is there a good balance of annotation types, or is the student over-relying on one type (like just highlighting)?
- Do the annotations collectively help in understanding the text, capturing key points, or showing critical engagement with the material?
- Offer specific examples from their annotations if possible, explaining why something is good or how it could be improved.

Be specific, constructive, and encouraging.";

const NO_ANNOTATIONS: &str = "The student has not made any annotations yet. You can encourage \
     them to start, perhaps by suggesting what type of annotation might be useful for this text.";

pub fn annotation_feedback(source: &str, annotations: &[FeedbackAnnotation]) -> String {
    let mut out = String::new();
    out.push_str(
        "You are an expert academic tutor. A student has provided you with a piece of text and \
         their annotations on that text.\nThe annotations can be of several types:\n",
    );
    // Writing into a String cannot fail.
    for kind in AnnotationType::ALL {
        let _ = writeln!(out, "- {kind}: {}", type_description(kind));
    }
    out.push('\n');
    out.push_str(ANNOTATION_CRITERIA);
    let _ = write!(out, "\n\nOriginal Text:\n```\n{source}\n```\n\nStudent Annotations:\n");

    if annotations.is_empty() {
        out.push_str(NO_ANNOTATIONS);
        out.push('\n');
    }
    for ann in annotations {
        let _ = writeln!(out, "- Annotated Text: \"{}\"", ann.text);
        let _ = writeln!(out, "  - Type: {}", ann.kind);
        if let Some(note) = &ann.note {
            let _ = writeln!(out, "  - Note: {note}");
        }
    }

    out.push_str("\nFeedback on Annotations:");
    out
}
