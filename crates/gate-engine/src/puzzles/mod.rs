pub mod matching;
pub mod sequence;
pub mod timing;
