use core::fmt;
use core::str::FromStr;

use crate::error::ParseError;

/**
    A country storefront: the two-letter country code and the numeric
    identifier the store expects in its `X-Apple-Store-Front` header.

    Only codes present in the fixed storefront table can be constructed,
    so an unknown country is rejected before any request is built.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Storefront {
    code: &'static str,
    id: u32,
}

impl Storefront {
    const fn new(code: &'static str, id: u32) -> Self {
        Self { code, id }
    }

    /**
        Look up a storefront by its two-letter country code (case-insensitive).
    */
    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim();
        STOREFRONTS
            .iter()
            .find(|s| s.code.eq_ignore_ascii_case(code))
            .copied()
    }

    /**
        Look up a storefront by its numeric identifier.
    */
    pub fn from_id(id: u32) -> Option<Self> {
        STOREFRONTS.iter().find(|s| s.id == id).copied()
    }

    /**
        Upper-case two-letter country code, e.g. `US`.
    */
    pub const fn code(self) -> &'static str {
        self.code
    }

    /**
        Numeric storefront identifier, e.g. `143441` for `US`.
    */
    pub const fn id(self) -> u32 {
        self.id
    }

    /**
        Every supported storefront, ordered by country code.
    */
    pub fn all() -> &'static [Storefront] {
        &STOREFRONTS
    }
}

impl Default for Storefront {
    fn default() -> Self {
        Self::new("US", 143441)
    }
}

impl fmt::Display for Storefront {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code)
    }
}

impl FromStr for Storefront {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s).ok_or_else(|| ParseError {
            kind: "storefront",
            value: s.to_owned(),
        })
    }
}

const STOREFRONTS: [Storefront; 132] = [
    Storefront::new("AE", 143481),
    Storefront::new("AG", 143540),
    Storefront::new("AI", 143538),
    Storefront::new("AL", 143575),
    Storefront::new("AM", 143524),
    Storefront::new("AO", 143564),
    Storefront::new("AR", 143505),
    Storefront::new("AT", 143445),
    Storefront::new("AU", 143460),
    Storefront::new("AZ", 143568),
    Storefront::new("BB", 143541),
    Storefront::new("BD", 143490),
    Storefront::new("BE", 143446),
    Storefront::new("BG", 143526),
    Storefront::new("BH", 143559),
    Storefront::new("BM", 143542),
    Storefront::new("BN", 143560),
    Storefront::new("BO", 143556),
    Storefront::new("BR", 143503),
    Storefront::new("BS", 143539),
    Storefront::new("BW", 143525),
    Storefront::new("BY", 143565),
    Storefront::new("BZ", 143555),
    Storefront::new("CA", 143455),
    Storefront::new("CH", 143459),
    Storefront::new("CI", 143527),
    Storefront::new("CL", 143483),
    Storefront::new("CN", 143465),
    Storefront::new("CO", 143501),
    Storefront::new("CR", 143495),
    Storefront::new("CY", 143557),
    Storefront::new("CZ", 143489),
    Storefront::new("DE", 143443),
    Storefront::new("DK", 143458),
    Storefront::new("DM", 143545),
    Storefront::new("DO", 143508),
    Storefront::new("DZ", 143563),
    Storefront::new("EC", 143509),
    Storefront::new("EE", 143518),
    Storefront::new("EG", 143516),
    Storefront::new("ES", 143454),
    Storefront::new("FI", 143447),
    Storefront::new("FR", 143442),
    Storefront::new("GB", 143444),
    Storefront::new("GD", 143546),
    Storefront::new("GH", 143573),
    Storefront::new("GR", 143448),
    Storefront::new("GT", 143504),
    Storefront::new("GY", 143553),
    Storefront::new("HK", 143463),
    Storefront::new("HN", 143510),
    Storefront::new("HR", 143494),
    Storefront::new("HU", 143482),
    Storefront::new("ID", 143476),
    Storefront::new("IE", 143449),
    Storefront::new("IL", 143491),
    Storefront::new("IN", 143467),
    Storefront::new("IS", 143558),
    Storefront::new("IT", 143450),
    Storefront::new("JM", 143511),
    Storefront::new("JO", 143528),
    Storefront::new("JP", 143462),
    Storefront::new("KE", 143529),
    Storefront::new("KN", 143548),
    Storefront::new("KR", 143466),
    Storefront::new("KW", 143493),
    Storefront::new("KY", 143544),
    Storefront::new("KZ", 143517),
    Storefront::new("LB", 143497),
    Storefront::new("LC", 143549),
    Storefront::new("LI", 143522),
    Storefront::new("LK", 143486),
    Storefront::new("LT", 143520),
    Storefront::new("LU", 143451),
    Storefront::new("LV", 143519),
    Storefront::new("MD", 143523),
    Storefront::new("MG", 143531),
    Storefront::new("MK", 143530),
    Storefront::new("ML", 143532),
    Storefront::new("MN", 143592),
    Storefront::new("MO", 143515),
    Storefront::new("MS", 143547),
    Storefront::new("MT", 143521),
    Storefront::new("MU", 143533),
    Storefront::new("MV", 143488),
    Storefront::new("MX", 143468),
    Storefront::new("MY", 143473),
    Storefront::new("NE", 143534),
    Storefront::new("NG", 143561),
    Storefront::new("NI", 143512),
    Storefront::new("NL", 143452),
    Storefront::new("NO", 143457),
    Storefront::new("NP", 143484),
    Storefront::new("NZ", 143461),
    Storefront::new("OM", 143562),
    Storefront::new("PA", 143485),
    Storefront::new("PE", 143507),
    Storefront::new("PH", 143474),
    Storefront::new("PK", 143477),
    Storefront::new("PL", 143478),
    Storefront::new("PT", 143453),
    Storefront::new("PY", 143513),
    Storefront::new("QA", 143498),
    Storefront::new("RO", 143487),
    Storefront::new("RS", 143500),
    Storefront::new("RU", 143469),
    Storefront::new("SA", 143479),
    Storefront::new("SE", 143456),
    Storefront::new("SG", 143464),
    Storefront::new("SI", 143499),
    Storefront::new("SK", 143496),
    Storefront::new("SN", 143535),
    Storefront::new("SR", 143554),
    Storefront::new("SV", 143506),
    Storefront::new("TC", 143552),
    Storefront::new("TH", 143475),
    Storefront::new("TN", 143536),
    Storefront::new("TR", 143480),
    Storefront::new("TT", 143551),
    Storefront::new("TW", 143470),
    Storefront::new("TZ", 143572),
    Storefront::new("UA", 143492),
    Storefront::new("UG", 143537),
    Storefront::new("US", 143441),
    Storefront::new("UY", 143514),
    Storefront::new("UZ", 143566),
    Storefront::new("VC", 143550),
    Storefront::new("VE", 143502),
    Storefront::new("VG", 143543),
    Storefront::new("VN", 143471),
    Storefront::new("YE", 143571),
    Storefront::new("ZA", 143472),
];
