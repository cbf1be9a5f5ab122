pub use orar_models::calendar::{
    AcademicYear, Classroom, CreateAcademicYearDto, CreateClassroomDto, CreateDisciplineDto,
    CreateGroupDto, CreateLearningTypeDto, CreateStudyYearDto, CreateTeacherDto, Discipline,
    Group, LearningType, LearningTypeWithStats, StudyYear, Teacher,
};
