/// Flat-file item reader: delimited line tokenizer, field set and mapper.
pub mod flat_file_reader;

pub use flat_file_reader::{
    DelimitedLineTokenizer, FieldSet, FieldSetMapper, FlatFileItemReader,
    FlatFileItemReaderBuilder,
};
