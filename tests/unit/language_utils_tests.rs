/*!
 * Tests for language utility functions
 */

use srtwai::language_utils::get_language_name;

/// Test English names used in prompts
#[test]
fn test_get_language_name_withValidCodes_shouldReturnEnglishName() {
    assert_eq!(get_language_name("en").unwrap(), "English");
    assert_eq!(get_language_name("fra").unwrap(), "French");
    assert_eq!(get_language_name("ger").unwrap(), "German");
    assert_eq!(get_language_name("zh").unwrap(), "Chinese");
    assert!(get_language_name("qq").is_err());
}

/// Test case, whitespace and bibliographic codes
#[test]
fn test_get_language_name_withVariantSpellings_shouldResolve() {
    assert_eq!(get_language_name(" EN ").unwrap(), "English");
    assert_eq!(get_language_name("fre").unwrap(), "French");
    assert!(get_language_name("").is_err());
    assert!(get_language_name("123").is_err());
}
