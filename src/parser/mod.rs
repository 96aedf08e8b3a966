// Price list parsing

pub mod csv_parser;

pub use csv_parser::parse_price_list;
