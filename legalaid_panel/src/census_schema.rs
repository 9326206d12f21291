//! Declarative schemas for the five 2011 census extracts.
//!
//! Each source table is described by the geography-code column it is keyed
//! on, the non-substantive columns to drop, and the (source column ->
//! canonical name) pairs to keep. Cleaning (`census::clean_census_table`) is
//! entirely schema-driven, so adding a further extract means adding a schema
//! here rather than writing new mapping logic.

use crate::COL;

#[derive(Debug, Clone, Copy)]
pub struct CensusTableSchema {
    /// Short identifier used in logs and error messages.
    pub name: &'static str,
    /// Source column holding the (possibly old-standard) area code.
    pub geography_code: &'static str,
    /// Non-substantive columns dropped before selection.
    pub drop: &'static [&'static str],
    /// Measure columns kept, as (source header, canonical name) pairs.
    pub keep: &'static [(&'static str, &'static str)],
    /// Whether the source covers other UK nations and must be filtered to
    /// England and Wales code prefixes.
    pub filter_england_wales: bool,
}

pub const POPULATION: CensusTableSchema = CensusTableSchema {
    name: "population",
    geography_code: COL::RAW_GEOGRAPHY_CODE,
    drop: &[
        "date",
        "geography",
        "Rural Urban",
        "Variable: Area (Hectares); measures: Value",
        "Variable: Density (number of persons per hectare); measures: Value",
        "Variable: Schoolchild or full-time student aged 4 and over at their non term-time address; measures: Value",
    ],
    keep: &[
        ("Variable: All usual residents; measures: Value", COL::RESIDENTS_TOTAL),
        ("Variable: Males; measures: Value", "males_total"),
        ("Variable: Females; measures: Value", "females_total"),
        ("Variable: Lives in a household; measures: Value", "household_dwellers"),
        ("Variable: Lives in a communal establishment; measures: Value", "communal_dwellers"),
    ],
    filter_england_wales: false,
};

pub const AGES: CensusTableSchema = CensusTableSchema {
    name: "ages",
    geography_code: COL::RAW_GEOGRAPHY_CODE,
    drop: &[
        "date",
        "geography",
        "Rural Urban",
        "Age: All usual residents; measures: Value",
        "Age: Mean Age; measures: Value",
        "Age: Median Age; measures: Value",
    ],
    keep: &[
        ("Age: Age 0 to 4; measures: Value", "total_0_4"),
        ("Age: Age 5 to 7; measures: Value", "total_5_7"),
        ("Age: Age 8 to 9; measures: Value", "total_8_9"),
        ("Age: Age 10 to 14; measures: Value", "total_10_14"),
        ("Age: Age 15; measures: Value", "total_15"),
        ("Age: Age 16 to 17; measures: Value", "total_16_17"),
        ("Age: Age 18 to 19; measures: Value", "total_18_19"),
        ("Age: Age 20 to 24; measures: Value", "total_20_24"),
        ("Age: Age 25 to 29; measures: Value", "total_25_29"),
        ("Age: Age 30 to 44; measures: Value", "total_30_44"),
        ("Age: Age 45 to 59; measures: Value", "total_45_59"),
        ("Age: Age 60 to 64; measures: Value", "total_60_64"),
        ("Age: Age 65 to 74; measures: Value", "total_65_74"),
        ("Age: Age 75 to 84; measures: Value", "total_75_84"),
        ("Age: Age 85 to 89; measures: Value", "total_85_89"),
        ("Age: Age 90 and over; measures: Value", "total_90_over"),
    ],
    filter_england_wales: false,
};

/// Age bands summed into the derived groupings.
pub const WORKING_AGE_BANDS: &[&str] = &[
    "total_16_17",
    "total_18_19",
    "total_20_24",
    "total_25_29",
    "total_30_44",
    "total_45_59",
    "total_60_64",
    "total_65_74",
];
pub const CHILDREN_BANDS: &[&str] = &[
    "total_0_4",
    "total_5_7",
    "total_8_9",
    "total_10_14",
    "total_15",
];
pub const PENSIONER_BANDS: &[&str] = &["total_75_84", "total_85_89", "total_90_over"];

pub const ECONOMIC_ACTIVITY: CensusTableSchema = CensusTableSchema {
    name: "economic_activity",
    geography_code: COL::RAW_GEOGRAPHY_CODE,
    drop: &[
        "date",
        "geography",
        "Economic Activity: All usual residents aged 16 to 74; measures: Value",
    ],
    keep: &[
        ("Economic Activity: Economically active; measures: Value", COL::ECON_ACTIVE),
        ("Economic Activity: Economically active: In employment; measures: Value", "a_employed"),
        ("Economic Activity: Economically active: Employee: Part-time; measures: Value", "a_part_time"),
        ("Economic Activity: Economically active: Employee: Full-time; measures: Value", "a_full_time"),
        ("Economic Activity: Economically active: Self-employed; measures: Value", "a_self_employed"),
        ("Economic Activity: Economically active: Unemployed; measures: Value", COL::A_UNEMPLOYED),
        ("Economic Activity: Economically active: Full-time student; measures: Value", "a_student"),
        ("Economic Activity: Economically Inactive; measures: Value", "econ_inactive"),
        ("Economic Activity: Economically inactive: Retired; measures: Value", "ia_retired"),
        ("Economic Activity: Economically inactive: Student (including full-time students); measures: Value", "ia_student"),
        ("Economic Activity: Economically inactive: Looking after home or family; measures: Value", "ia_carer"),
        ("Economic Activity: Economically inactive: Long-term sick or disabled; measures: Value", "ia_sick_disb"),
        ("Economic Activity: Economically inactive: Other; measures: Value", "ina_other"),
        ("Economic Activity: Unemployed: Age 16 to 24; measures: Value", "unemployed_16_24"),
        ("Economic Activity: Unemployed: Age 50 to 74; measures: Value", "unemployed_50_74"),
        ("Economic Activity: Unemployed: Never worked; measures: Value", "unemployed_forever"),
        ("Economic Activity: Long-term unemployed; measures: Value", "unemployed_lt"),
    ],
    filter_england_wales: true,
};

pub const HOUSING_TENURE: CensusTableSchema = CensusTableSchema {
    name: "housing_tenure",
    geography_code: COL::RAW_GEOGRAPHY_CODE,
    drop: &["date", "geography", "Rural Urban"],
    keep: &[
        ("Tenure: All households; measures: Value", COL::HOUSEHOLDS),
        ("Tenure: Owned; measures: Value", COL::HH_OWNED),
        ("Tenure: Owned: Owned outright; measures: Value", "hh_owned_outright"),
        ("Tenure: Owned: Owned with a mortgage or loan; measures: Value", "hh_owned_mortgaged"),
        ("Tenure: Shared ownership (part owned and part rented); measures: Value", "hh_shared_own"),
        ("Tenure: Social rented; measures: Value", COL::HH_SOCIAL_RENTED),
        ("Tenure: Social rented: Rented from council (Local Authority); measures: Value", "hh_social_rented_council"),
        ("Tenure: Social rented: Other; measures: Value", "hh_social_rented_other"),
        ("Tenure: Private rented; measures: Value", COL::HH_PRIVATE_RENTED),
        ("Tenure: Private rented: Private landlord or letting agency; measures: Value", "hh_private_rented_landlord"),
        ("Tenure: Private rented: Other; measures: Value", "hh_private_rented_other"),
        ("Tenure: Living rent free; measures: Value", "hh_rent_free"),
    ],
    filter_england_wales: true,
};

pub const ETHNICITY: CensusTableSchema = CensusTableSchema {
    name: "ethnicity",
    geography_code: COL::RAW_GEOGRAPHY_CODE,
    drop: &["date", "geography", "Rural Urban"],
    keep: &[
        ("Ethnic Group: All usual residents; measures: Value", COL::RESIDENTS),
        ("Ethnic Group: White; measures: Value", COL::ETH_WHITE),
        ("Ethnic Group: White: English/Welsh/Scottish/Northern Irish/British; measures: Value", "eth_white_brit"),
        ("Ethnic Group: White: Irish; measures: Value", "eth_white_irish"),
        ("Ethnic Group: White: Gypsy or Irish Traveller; measures: Value", "eth_white_trav"),
        ("Ethnic Group: White: Other White; measures: Value", "eth_white_other"),
        ("Ethnic Group: Mixed/multiple ethnic groups; measures: Value", COL::ETH_MIXED),
        ("Ethnic Group: Mixed/multiple ethnic groups: White and Black Caribbean; measures: Value", "eth_mixed_carrib"),
        ("Ethnic Group: Mixed/multiple ethnic groups: White and Black African; measures: Value", "eth_mixed_afr"),
        ("Ethnic Group: Mixed/multiple ethnic groups: White and Asian; measures: Value", "eth_mixed_asian"),
        ("Ethnic Group: Mixed/multiple ethnic groups: Other Mixed; measures: Value", "eth_mixed_other"),
        ("Ethnic Group: Asian/Asian British; measures: Value", COL::ETH_ASIAN),
        ("Ethnic Group: Asian/Asian British: Indian; measures: Value", "eth_asian_ind"),
        ("Ethnic Group: Asian/Asian British: Pakistani; measures: Value", "eth_asian_pak"),
        ("Ethnic Group: Asian/Asian British: Bangladeshi; measures: Value", "eth_asian_bang"),
        ("Ethnic Group: Asian/Asian British: Chinese; measures: Value", "eth_asian_chi"),
        ("Ethnic Group: Asian/Asian British: Other Asian; measures: Value", "eth_asian_other"),
        ("Ethnic Group: Black/African/Caribbean/Black British; measures: Value", COL::ETH_BLACK),
        ("Ethnic Group: Black/African/Caribbean/Black British: African; measures: Value", "eth_black_afr"),
        ("Ethnic Group: Black/African/Caribbean/Black British: Caribbean; measures: Value", "eth_black_carrib"),
        ("Ethnic Group: Black/African/Caribbean/Black British: Other Black; measures: Value", "eth_black_other"),
        ("Ethnic Group: Other ethnic group; measures: Value", COL::ETH_OTHER),
        ("Ethnic Group: Other ethnic group: Arab; measures: Value", "eth_other_arab"),
        ("Ethnic Group: Other ethnic group: Any other ethnic group; measures: Value", "eth_other_other"),
    ],
    filter_england_wales: true,
};
