//! 에러 코드 상수 정의
//!
//! 프론트엔드에서 i18n 처리를 위해 에러 코드를 문자열로 반환합니다.

/// Job 이름이 비어 있음
pub const ERR_EMPTY_JOB_NAME: &str = "ERR_EMPTY_JOB_NAME";

/// 이미 존재하는 Job 이름
pub const ERR_DUPLICATE_JOB_NAME: &str = "ERR_DUPLICATE_JOB_NAME";

/// 변경 사항 없음
pub const ERR_NO_CHANGES: &str = "ERR_NO_CHANGES";

/// 입력값 검증 실패
pub const ERR_INVALID_INPUT: &str = "ERR_INVALID_INPUT";

/// 소스/대상 폴더가 존재하지 않음
pub const ERR_PATH_INELIGIBLE: &str = "ERR_PATH_INELIGIBLE";

/// syncwatch CLI 실행 실패
pub const ERR_COMMAND_FAILED: &str = "ERR_COMMAND_FAILED";

/// CLI 응답 파싱 실패
pub const ERR_INVALID_RESPONSE: &str = "ERR_INVALID_RESPONSE";

/// 설정 파일 오류
pub const ERR_CONFIG: &str = "ERR_CONFIG";
