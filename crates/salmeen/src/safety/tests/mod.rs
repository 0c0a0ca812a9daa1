mod coach;
mod common;
mod scoring;
