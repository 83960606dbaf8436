pub mod sta_lta;
pub use sta_lta::{
    sta_lta, sta_lta_batch, StaLtaBatchBuilder, StaLtaBatchOutput, StaLtaBuilder, StaLtaData,
    StaLtaError, StaLtaInput, StaLtaOutput, StaLtaParams,
};
