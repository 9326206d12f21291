//! This module stores the canonical column names used across every stage of the
//! panel pipeline. The raw source files use their own headers (see the `RAW_*`
//! constants); everything downstream of the loaders refers to the names below.

// Panel keys
pub const YEAR_QUARTER: &str = "year_quarter";
pub const LA_CODE: &str = "lacode";
pub const LA_NAME: &str = "localauthority";

// Cleaned case-level columns
pub const VOLUME: &str = "volume";
pub const VALUE: &str = "value";
pub const FIN_YEAR_START: &str = "fy_start";
pub const FIN_QUARTER: &str = "fq";
pub const FIRM_CODE: &str = "firm_code";

// Area-quarter facts
pub const LA_TOTAL_VOLUME: &str = "la_total_volume";
pub const LA_TOTAL_VALUE: &str = "la_total_value";
pub const UNIQUE_PROVIDERS: &str = "unique_providers";

// National quarterly totals
pub const TOTAL_VOLUME: &str = "total_volume";
pub const TOTAL_VALUE: &str = "total_value";
pub const TOTAL_UNIQUE_PROVIDERS: &str = "total_unique_providers";

// Inflation and derived value columns
pub const INDEX_15: &str = "index_15";
pub const ADJUSTED_LA_TOTAL_VALUE: &str = "adjusted_la_total_value";
pub const ADJUSTED_TOTAL_VALUE: &str = "adjusted_total_value";
pub const VAL_VOL: &str = "val_vol";
pub const LA_VAL_VOL: &str = "la_val_vol";
pub const VOLUME_INDEX: &str = "volume_index";
pub const VALUE_INDEX: &str = "value_index";
pub const CASES_INDEX: &str = "cases_index";

// Panel-level derived variables
pub const LOG_RESIDENTS_TOTAL: &str = "log_residents_total";
pub const LOG_WORKING_AGE: &str = "log_working_age";
pub const VALUE_PC: &str = "value_pc";
pub const EXPOSURE: &str = "exposure";
pub const POST: &str = "post";
pub const DESERT: &str = "desert";
pub const EVER_DESERT: &str = "ever_desert";
pub const PROP_ZERO: &str = "prop_zero";
pub const POP_ZERO: &str = "pop_zero";

// Rurality
pub const RURAL_CODE: &str = "rural_code";
pub const IS_RURAL: &str = "is_rural";

// Census columns referenced by derivations. The remaining canonical census
// names are declared once in the per-source schemas (`census_schema`).
pub const RESIDENTS_TOTAL: &str = "residents_total";
pub const WORKING_AGE: &str = "working_age";
pub const CHILDREN: &str = "children";
pub const PENSIONER: &str = "pensioner";
pub const ECON_ACTIVE: &str = "econ_active";
pub const A_UNEMPLOYED: &str = "a_unemployed";
pub const UNEMPLOYMENT_RATE: &str = "unemployment_rate";
pub const HOUSEHOLDS: &str = "households";
pub const HH_OWNED: &str = "hh_owned";
pub const HH_SOCIAL_RENTED: &str = "hh_social_rented";
pub const HH_PRIVATE_RENTED: &str = "hh_private_rented";
pub const PROP_HH_OWNED: &str = "prop_hh_owned";
pub const PROP_HH_SOCIAL_RENTED: &str = "prop_hh_social_rented";
pub const PROP_HH_PRIVATE_RENTED: &str = "prop_hh_private_rented";
pub const PROP_HH_RENTED: &str = "prop_hh_rented";
pub const RESIDENTS: &str = "residents";
pub const ETH_WHITE: &str = "eth_white";
pub const ETH_MIXED: &str = "eth_mixed";
pub const ETH_ASIAN: &str = "eth_asian";
pub const ETH_BLACK: &str = "eth_black";
pub const ETH_OTHER: &str = "eth_other";
pub const PROP_ETH_WHITE: &str = "prop_eth_white";
pub const PROP_ETH_MIXED: &str = "prop_eth_mixed";
pub const PROP_ETH_ASIAN: &str = "prop_eth_asian";
pub const PROP_ETH_BLACK: &str = "prop_eth_black";
pub const PROP_ETH_OTHER: &str = "prop_eth_other";

// Raw source headers. These must stay in sync with the published extracts.
pub const RAW_VOL: &str = "VOL";
pub const RAW_TOTAL_VALUE: &str = "Total Value";
pub const RAW_FIN_YR: &str = "Fin_YR";
pub const RAW_FIN_QTR: &str = "FIN_QTR";
pub const RAW_LA_CODE: &str = "LACode";
pub const RAW_FIRM_CODE: &str = "firm_code";
pub const RAW_LAD23CD: &str = "LAD23CD";
pub const RAW_LAD23NM: &str = "LAD23NM";
pub const RAW_CONVERTER_OLD: &str = "Old";
pub const RAW_CONVERTER_NEW: &str = "New";
pub const RAW_GEOGRAPHY_CODE: &str = "geography code";
