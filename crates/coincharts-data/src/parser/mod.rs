//! 문서 파서 모듈.
//!
//! 원시 마크업/JSON 페이로드를 구조화된 레코드로 변환하는 순수 함수들입니다.
//! I/O 부수 효과가 없으며 입력 텍스트가 같으면 결과도 같습니다.
//!
//! - `parse_exchange_list`: 거래소 목록 페이지 (HTML)
//! - `parse_exchange_detail`: 거래소 상세 페이지 (HTML, 요약 + 페어 테이블)
//! - `parse_price_volume`: 가격/거래량 시계열 (JSON 배열의 배열)

pub mod exchange_detail;
pub mod exchanges;
pub mod price_volume;

pub use exchange_detail::parse_exchange_detail;
pub use exchanges::parse_exchange_list;
pub use price_volume::parse_price_volume;

use rust_decimal::Decimal;
use scraper::Selector;

use crate::error::{DataError, Result};

/// CSS 셀렉터를 컴파일합니다. 셀렉터 문자열은 모두 고정 리터럴입니다.
pub(crate) fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|_| DataError::Parse(format!("invalid selector '{}'", css)))
}

/// 천 단위 구분 쉼표를 제거하고 숫자로 변환합니다.
pub(crate) fn parse_decimal(raw: &str) -> Result<Decimal> {
    let cleaned = raw.trim().replace(',', "");
    cleaned
        .parse()
        .map_err(|_| DataError::Parse(format!("invalid number '{}'", raw)))
}

/// 요소의 텍스트 노드를 하나의 문자열로 합칩니다.
pub(crate) fn element_text(element: &scraper::ElementRef<'_>) -> String {
    element.text().collect::<String>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_decimal_strips_thousands_separators() {
        assert_eq!(parse_decimal("2,364,939.84").unwrap(), dec!(2364939.84));
        assert_eq!(parse_decimal("23,336").unwrap(), dec!(23336));
        assert_eq!(parse_decimal(" 635 ").unwrap(), dec!(635));
        assert!(parse_decimal("n/a").is_err());
        assert!(parse_decimal("").is_err());
    }
}
