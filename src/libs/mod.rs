pub mod counts;
pub mod entrez;
pub mod haplotype;
pub mod io;
pub mod matrix;
pub mod nexus;
pub mod record;
pub mod traits;
