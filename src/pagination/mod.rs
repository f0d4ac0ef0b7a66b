mod cursor;

pub use cursor::ListingCursor;
