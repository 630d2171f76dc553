// Resume screening: rank uploaded resumes against a job description.
// extract → similarity → results, then keywords for the top-K display.

pub mod experience;
pub mod handlers;
pub mod keywords;
pub mod pipeline;
pub mod results;
pub mod similarity;
